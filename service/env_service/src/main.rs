use std::net::SocketAddr;

use env_service::make_app;
use maze_env::register_default_env as register_maze;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Pre-register environments for /envs and factory-based init
    register_maze();
    let app = make_app();

    let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
    info!("Environment service listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
