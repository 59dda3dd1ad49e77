use std::time::Duration;

use clap::{Parser, Subcommand};
use mock_api_harness::client::{ApiResponse, ResilientClient};
use mock_api_harness::config::load_from_env;
use mock_api_harness::observability::logging::init_logging;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "harness-cli")]
#[command(about = "Query the mock API through the resilient client", long_about = None)]
struct Cli {
    /// Base URL (defaults to BASE_URL, then http://127.0.0.1:8000)
    #[arg(short, long)]
    url: Option<String>,

    /// Per-request timeout in seconds (defaults to DEFAULT_TIMEOUT)
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Disable retries
    #[arg(long)]
    no_retry: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service readiness
    Health,
    /// Show problem stats and recently solved problems
    Problems,
    /// Look up a user by id
    User { id: i64 },
    /// GET an arbitrary path
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_from_env(None)?;
    init_logging(&config.observability.log_level);

    if let Some(url) = cli.url {
        config.client.base_url = url;
    }
    if let Some(timeout) = cli.timeout {
        config.client.default_timeout_secs = timeout;
    }
    if cli.no_retry {
        config.retries.max_retries = 0;
    }

    let client = ResilientClient::from_config(&config.client, &config.retries)?;

    let path = match cli.command {
        Commands::Health => "/health".to_string(),
        Commands::Problems => "/problems".to_string(),
        Commands::User { id } => format!("/users/{}", id),
        Commands::Get { path } => path,
    };

    let res = client.get(&path).await?;
    print_response(&res, client.timeout())
}

fn print_response(res: &ApiResponse, timeout: Duration) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "{} {} ({} ms, {} retries, timeout {:?})",
        res.status,
        res.url,
        res.elapsed.as_millis(),
        res.retries,
        timeout
    );

    match res.json::<Value>() {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", res.text()),
    }

    if !res.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
