//! OpenAPI fragment describing the books routes.

use serde_json::{json, Value};

pub fn fragment() -> Value {
    json!({
        "paths": paths(),
        "components": { "schemas": schemas() }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema_ref("ErrorResponse") } }
    })
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn json_body(schema_name: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(schema_name) } }
    })
}

fn id_param() -> Value {
    json!({ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } })
}

/// Operation on `/books/{id}/...` taking a JSON body and returning a book.
fn book_mutation(summary: &str, body: &str, bad_request: &str) -> Value {
    json!({
        "summary": summary,
        "tags": ["Books"],
        "parameters": [id_param()],
        "requestBody": json_body(body),
        "responses": {
            "200": json_response("Updated book", schema_ref("Book")),
            "400": error_response(bad_request),
            "404": error_response("Book not found")
        }
    })
}

fn paths() -> Value {
    let health = json!({
        "get": {
            "summary": "Catalog health and size",
            "tags": ["Books"],
            "responses": {
                "200": json_response("Catalog is reachable", schema_ref("Health")),
                "500": error_response("Storage failure")
            }
        }
    });

    let books = json!({
        "get": {
            "summary": "List books, newest first",
            "tags": ["Books"],
            "responses": {
                "200": json_response("List of books", json!({ "type": "array", "items": schema_ref("Book") })),
                "500": error_response("Storage failure")
            }
        },
        "post": {
            "summary": "Create a book",
            "tags": ["Books"],
            "requestBody": json_body("CreateBook"),
            "responses": {
                "201": json_response("Created book", schema_ref("Book")),
                "400": error_response("Validation error")
            }
        }
    });

    let recommend = json!({
        "get": {
            "summary": "Recommend same-genre titles",
            "tags": ["Books"],
            "parameters": [
                { "name": "title", "in": "query", "required": true, "schema": { "type": "string" } }
            ],
            "responses": {
                "200": json_response("Recommendations", schema_ref("Recommendation")),
                "400": error_response("Missing title"),
                "404": error_response("Title not found")
            }
        }
    });

    let replace = json!({
        "put": {
            "summary": "Add a same-genre replacement for a banned book",
            "tags": ["Books"],
            "parameters": [id_param()],
            "requestBody": json_body("ReplaceBook"),
            "responses": {
                "201": json_response("Replacement added", schema_ref("Replacement")),
                "400": error_response("Not banned, genre mismatch or invalid fields"),
                "404": error_response("Book not found")
            }
        }
    });

    json!({
        "/health": health,
        "/books": books,
        "/recommend": recommend,
        "/books/{id}/status": {
            "patch": book_mutation("Set a book's status", "StatusUpdate", "Invalid status")
        },
        "/books/{id}/replace": replace,
        "/books/{id}/rating": {
            "patch": book_mutation("Update a book's rating", "RatingUpdate", "Rating out of range")
        }
    })
}

fn schemas() -> Value {
    let book = json!({
        "type": "object",
        "properties": {
            "id": { "type": "string" },
            "title": { "type": "string" },
            "genre": { "type": "string" },
            "author": { "type": ["string", "null"] },
            "year": { "type": ["integer", "null"], "minimum": 1000, "maximum": 9999 },
            "rating": { "type": ["number", "null"], "minimum": 0, "maximum": 5 },
            "status": { "type": "string", "enum": ["active", "banned"] },
            "createdAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" }
        },
        "required": ["id", "title", "genre", "status", "createdAt", "updatedAt"]
    });

    let create_book = json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "genre": { "type": "string" },
            "author": { "type": "string" },
            "year": { "type": "integer" },
            "rating": { "type": "number" }
        },
        "required": ["title", "genre"]
    });

    let replace_book = json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "genre": { "type": "string", "description": "Must equal the banned book's genre" },
            "author": { "type": "string" },
            "year": { "type": "integer" },
            "rating": { "type": "number" }
        },
        "required": ["title"]
    });

    let replacement = json!({
        "type": "object",
        "properties": {
            "message": { "type": "string" },
            "banned": {
                "type": "object",
                "properties": {
                    "id": { "type": "string" },
                    "title": { "type": "string" },
                    "genre": { "type": "string" },
                    "status": { "type": "string" }
                }
            },
            "replacement": schema_ref("Book")
        },
        "required": ["message", "banned", "replacement"]
    });

    json!({
        "Book": book,
        "CreateBook": create_book,
        "ReplaceBook": replace_book,
        "StatusUpdate": {
            "type": "object",
            "properties": { "status": { "type": "string", "enum": ["active", "available", "banned"] } },
            "required": ["status"]
        },
        "RatingUpdate": {
            "type": "object",
            "properties": { "rating": { "type": "number", "minimum": 0, "maximum": 5 } },
            "required": ["rating"]
        },
        "Recommendation": {
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "recommendations": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["message", "recommendations"]
        },
        "Replacement": replacement,
        "Health": {
            "type": "object",
            "properties": {
                "ok": { "type": "boolean" },
                "booksLoaded": { "type": "integer" },
                "pid": { "type": "integer" }
            },
            "required": ["ok", "booksLoaded"]
        }
    })
}
