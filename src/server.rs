//! Application bootstrap: wire the catalog, drive the module lifecycle,
//! and serve HTTP until shutdown.

use anyhow::Context;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{register_all, Catalog};

/// Build a registry holding every catalog module.
pub fn build_registry(catalog: &Catalog) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    register_all(&mut registry, catalog).context("failed to register catalog modules")?;
    Ok(registry)
}

/// Router for the full API over an in-memory catalog.
pub fn in_memory_router(settings: &Settings) -> anyhow::Result<axum::Router> {
    let catalog = Catalog::in_memory(&settings.cache);
    let registry = build_registry(&catalog)?;
    Ok(bookstore_http::build_router(&registry, settings))
}

/// Run the server until ctrl-c, then stop modules in reverse order.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let catalog = Catalog::in_memory(&settings.cache);
    let registry = build_registry(&catalog)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &settings).await;
    let stopped = registry.stop_modules().await;

    served?;
    stopped
}
