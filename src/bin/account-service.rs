use eripotter::{app, config, state::AccountState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    app::init_tracing("account_service=info,eripotter=info,sqlx=warn,tower_http=info");

    let config = config::AccountConfig::from_env()?;
    let (host, port) = (config.host.clone(), config.port);
    let state = AccountState::init(config).await?;

    tracing::info!(port, "account service starting");
    app::serve(app::build_account(state), &host, port).await
}
