use anyhow::Context;
use shelfcheck_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load shelfcheck settings")?;
    shelfcheck::app::serve(settings).await
}
