use target_mcp_server::config::ServerConfig;
use target_mcp_server::dispatcher::Dispatcher;
use target_mcp_server::scratch::ScratchSpace;
use target_mcp_server::server::McpServer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    config.log_summary();

    let scratch = match ScratchSpace::create() {
        Ok(s) => s,
        Err(e) => {
            error!("failed to create scratch directory: {e}");
            std::process::exit(1);
        }
    };

    let dispatcher = match Dispatcher::from_config(config, scratch.paths().clone()) {
        Ok(d) => d,
        Err(e) => {
            error!("startup failed: {e}");
            scratch.cleanup();
            std::process::exit(1);
        }
    };
    info!(tools = dispatcher.list_tools().len(), "Adobe Target MCP server running on stdio");

    let mut server = McpServer::new(dispatcher);
    let outcome = tokio::select! {
        result = server.run() => result,
        _ = shutdown_signal() => {
            info!("shutting down");
            Ok(())
        }
    };

    scratch.cleanup();
    if let Err(e) = outcome {
        error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
