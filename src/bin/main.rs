use clap::Parser;
use eyre::WrapErr;
use listenfd::ListenFd;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use raw_http_server::{serve, AnyResult, ServerConfig, ServerData};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raw_http_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(ServerConfig::parse()).await
}

async fn run(config: ServerConfig) -> AnyResult<()> {
    tracing::info!(
        directory = %config.directory.display(),
        max_request_bytes = config.max_request_bytes,
        read_timeout_secs = config.read_timeout_secs,
        "configuration loaded"
    );

    let socket = match ListenFd::from_env().take_tcp_listener(0)? {
        Some(inherited) => {
            inherited.set_nonblocking(true)?;
            TcpListener::from_std(inherited)?
        }
        None => TcpListener::bind(&config.address)
            .await
            .wrap_err_with(|| format!("Failed to bind to {}", config.address))?,
    };

    let server_data = ServerData::from(&config);
    tokio::select! {
        served = serve(socket, server_data) => served,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
