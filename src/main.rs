use anyhow::Result;
use clap::Parser;

use cod_gateway::config::{GatewayConfig, API_KEY_ENV, DEFAULT_UPSTREAM_URL};
use cod_gateway::server;

/// Chat-completion gateway fronting a single Fireworks inference endpoint,
/// with an optional two-stage Enhanced Chain-of-Draft pipeline.
#[derive(Parser, Debug)]
#[command(name = "cod-gateway", version, about)]
struct CliArgs {
    /// Host to bind the gateway on
    #[arg(long, env = "COD_GATEWAY_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the gateway on
    #[arg(long, env = "COD_GATEWAY_PORT", default_value_t = 3000)]
    port: u16,

    /// Upstream chat-completions endpoint
    #[arg(long, env = "COD_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    upstream_url: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 600)]
    request_timeout_secs: u64,

    /// Enable debug-level logging
    #[arg(long)]
    verbose: bool,

    /// Directory for rolling log files; stdout only when unset
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        upstream_url: args.upstream_url,
        api_key: std::env::var(API_KEY_ENV).ok(),
        request_timeout_secs: args.request_timeout_secs,
        verbose: args.verbose,
        log_dir: args.log_dir,
    };

    server::startup(config).await
}
