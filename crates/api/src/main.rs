use anyhow::Context;

use autosales_infra::SalesConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    autosales_observability::init();

    let config = SalesConfig::from_env().context("invalid configuration")?;
    let app = autosales_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server crashed")?;
    Ok(())
}
