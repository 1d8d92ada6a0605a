use goal_tracker::{AppState, Config, load_data, router};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let data = load_data(&config.data_path).await;
    info!(
        path = %config.data_path.display(),
        goals = data.goals.len(),
        objectives = data.objectives.len(),
        "loaded tracker data"
    );
    let app = router(AppState::new(config.data_path.clone(), data));

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
