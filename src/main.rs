mod cli;

use clap::Parser;
use cli::{Cli, Commands, DispatchArgs};
use taskrelay::config::Config;
use taskrelay::dispatch::Dispatcher;
use taskrelay::storage::is_valid_bundle;
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Server(args) => {
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            taskrelay::api::run(config).await?
        }
        Commands::Dispatch(args) => dispatch_once(config, args).await?,
    }

    Ok(())
}

/// One-off dispatch without the HTTP server
async fn dispatch_once(mut config: Config, args: DispatchArgs) -> Result<(), AnyError> {
    if !is_valid_bundle(&args.bundle) {
        return Err(format!("invalid bundle name: {:?}", args.bundle).into());
    }
    if let Some(servers) = args.servers {
        config.roster.servers_path = servers;
    }
    if let Some(sessions) = args.sessions {
        config.roster.sessions_path = sessions;
    }

    let dispatcher = Dispatcher::from_config(&config.dispatch)?;
    let report = dispatcher
        .dispatch_from_files(&config.roster, &args.items, &args.bundle)
        .await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(response) => println!("[{}] {} ok: {}", outcome.index, outcome.server, response),
            Err(e) => println!("[{}] {} failed: {}", outcome.index, outcome.server, e),
        }
    }
    println!(
        "dispatch {}: {} sent, {} succeeded, {} failed",
        report.dispatch_id,
        report.attempted,
        report.succeeded(),
        report.failed()
    );

    Ok(())
}
