use log::info;
use server::{app, state::AppState, utils::shutdown::shutdown_signal};

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    info!("Running axum on http://{addr}/api");

    axum::serve(listener, app(AppState::new()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
