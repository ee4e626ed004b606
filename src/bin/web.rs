use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use gemini_ask::config::{self, Settings};
use gemini_ask::{ConfigError, QueryError, web};
use tokio::net::TcpListener;

fn main() {
    config::load_dotenv();
    gemini_ask::init_tracing("info");

    if let Err(e) = run() {
        if is_configuration_error(&e) {
            eprintln!("Configuration Error: {e:#}");
            eprintln!("\nTip: Create a .env file with GEMINI_API_KEY=your_key");
        } else {
            eprintln!("Unexpected Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn is_configuration_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || cause
                .downcast_ref::<QueryError>()
                .is_some_and(QueryError::is_configuration)
    })
}

/// Builds the client, then serves the form on `0.0.0.0:$PORT`.
///
/// The blocking HTTP client must not be created or finally dropped inside the async
/// runtime, so the runtime is built by hand and `main` keeps its own reference.
fn run() -> Result<()> {
    let settings = Settings::from_env(None)?;
    let client = Arc::new(settings.query_client()?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let served = runtime.block_on(async {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        web::serve(listener, Arc::clone(&client))
            .await
            .context("Web server failed")
    });

    drop(runtime);
    drop(client);
    served
}
