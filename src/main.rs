use covid_dashboard::{fetch::fetch, router, AppState, Config, DashboardState};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    info!(url = %config.source.url, variant = ?config.variant, "loading dataset");

    let client = reqwest::Client::new();
    let result = fetch(&client, &config.source).await;
    if let Err(err) = &result {
        error!("failed to load dataset: {err}");
    }
    let dashboard = DashboardState::from_fetch(&config, result);
    if let DashboardState::Ready(dashboard) = &dashboard {
        info!(
            rows = dashboard.series.len(),
            last_updated = ?dashboard.last_updated,
            "dashboard ready"
        );
    }

    let app = router(AppState::new(dashboard));
    let addr = config.bind_addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
