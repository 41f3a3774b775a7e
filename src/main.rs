use anyhow::Context;
use bookrec_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookrec settings")?;
    bookrec_telemetry::init(&settings.telemetry)?;

    bookrec_app::serve(settings).await
}
