use deploy_api::config::load_config;
use deploy_api::startup::Application;
use deploy_api::telemetry::init_tracing;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    // We start the runtime.
    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config = load_config()?;
    info!("starting api with settings:\n{}", config.application);

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
