use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskrelay")]
#[command(about = "Splits work batches across worker servers and collects their results", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $TASKRELAY_CONFIG or config/taskrelay.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
    /// Send one batch to the worker roster and print per-worker outcomes
    Dispatch(DispatchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct DispatchArgs {
    /// Bundle name forwarded to every worker
    #[arg(long)]
    pub bundle: String,

    /// Worker roster file (overrides roster.servers_path)
    #[arg(long)]
    pub servers: Option<PathBuf>,

    /// Session set file (overrides roster.sessions_path)
    #[arg(long)]
    pub sessions: Option<PathBuf>,

    /// URLs or usernames to distribute
    #[arg(required = true)]
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_command() {
        let cli = Cli::try_parse_from(["taskrelay", "server", "--address", "127.0.0.1:8081"]).unwrap();
        match cli.command {
            Commands::Server(args) => {
                assert_eq!(args.address, Some("127.0.0.1:8081".parse().unwrap()))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_dispatch_command() {
        let cli = Cli::try_parse_from([
            "taskrelay",
            "--config",
            "relay.toml",
            "dispatch",
            "--bundle",
            "b1",
            "url1",
            "url2",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("relay.toml")));
        match cli.command {
            Commands::Dispatch(args) => {
                assert_eq!(args.bundle, "b1");
                assert_eq!(args.items, vec!["url1", "url2"]);
                assert!(args.servers.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_requires_items() {
        assert!(Cli::try_parse_from(["taskrelay", "dispatch", "--bundle", "b1"]).is_err());
    }
}
