use std::io::{self, Write};

use copilot_proxy_client::{InvokerConfig, Invoker};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = InvokerConfig::from_env();
    let mut stdout = io::stdout().lock();

    // Errors are printed to stdout by the invoker; the exit status stays zero.
    match config.provider_config().into_client() {
        Ok(client) => {
            let invoker = Invoker::new(client, config.model, config.prompt);
            if let Err(e) = invoker.run(&mut stdout).await {
                tracing::error!(error = %e, "failed to write output");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create completion client");
            let _ = writeln!(stdout, "Error creating completion client: {e}");
        }
    }
}
