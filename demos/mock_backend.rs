//! Demo upstream: serves `/api/hello` and `/healthz` on each given port.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use clap::Parser;

#[derive(Parser)]
#[command(name = "mock-backend")]
#[command(about = "Demo upstream servers for trying out healthgate", long_about = None)]
struct Cli {
    /// Ports to listen on, one server per port.
    #[arg(default_values_t = [8080u16, 8081])]
    ports: Vec<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut servers = Vec::new();
    for (index, port) in cli.ports.into_iter().enumerate() {
        let greeting = format!("Hello from server {}", index + 1);
        let app = Router::new()
            .route(
                "/api/hello",
                get(move || {
                    let greeting = greeting.clone();
                    async move { greeting }
                }),
            )
            .route("/healthz", get(|| async { "OK" }));

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "Mock backend listening");
        servers.push(tokio::spawn(async move { axum::serve(listener, app).await }));
    }

    for server in servers {
        server.await??;
    }
    Ok(())
}
