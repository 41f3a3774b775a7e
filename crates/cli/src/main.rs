use anyhow::Context;
use bookrec_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Books catalog service
#[derive(Debug, Parser)]
#[command(name = "bookrec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending Postgres migrations
    Migrate,
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookrec settings")?;

    match cli.command {
        Command::Serve { port } => {
            bookrec_telemetry::init(&settings.telemetry)?;
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookrec_app::serve(settings).await
        }
        Command::Migrate => {
            bookrec_telemetry::init(&settings.telemetry)?;
            let applied = bookrec_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {} migration(s)", applied);
            Ok(())
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
