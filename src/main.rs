use anyhow::Context;
use bookstore_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        cache_ttl_secs = settings.cache.ttl_secs,
        "bookstore-app bootstrap starting"
    );

    bookstore_app::server::run(settings).await
}
