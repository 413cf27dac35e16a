//! Server bootstrap shared by the binaries.

use anyhow::Context;
use shelfcheck_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// Initialize telemetry and modules, then serve until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    shelfcheck_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        catalog = %settings.catalog.search_url_template,
        "shelfcheck bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry
        .init_modules(&ctx)
        .await
        .context("module initialization failed")?;
    registry
        .start_modules(&ctx)
        .await
        .context("module start failed")?;

    tracing::info!("shelfcheck bootstrap complete");

    let served = shelfcheck_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}
