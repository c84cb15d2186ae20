use eripotter::{app, config, state::GatewayState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    app::init_tracing("gateway=info,eripotter=info,tower_http=info");

    let config = config::GatewayConfig::from_env()?;
    for upstream in &config.upstreams {
        match &upstream.base_url {
            Some(url) => tracing::info!(service = %upstream.service, %url, "upstream"),
            None => tracing::warn!(service = %upstream.service, "upstream not configured"),
        }
    }
    tracing::info!(timeout = ?config.upstream_timeout, origins = config.cors_origins.len(), "gateway config loaded");

    let state = GatewayState::init(&config)?;
    app::serve(app::build_gateway(state), &config.host, config.port).await
}
