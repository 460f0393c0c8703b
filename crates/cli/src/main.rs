//! ragguard CLI: the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP gateway
//! - `ask`: Authenticate and answer one question without HTTP
//! - `hash-password`: Print an Argon2 hash for `[[auth.users]]`
//! - `init`: Write the default config

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragguard",
    about = "ragguard: role-scoped retrieval-augmented question answering",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.ragguard/config.toml)
    #[arg(short, long, global = true, env = "RAGGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Log in and answer a single question
    Ask {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "RAGGUARD_PASSWORD", hide_env_values = true)]
        password: String,

        /// The question to answer
        question: String,
    },

    /// Hash a password for a `[[auth.users]]` entry
    HashPassword {
        password: String,
    },

    /// Write the default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask {
            username,
            password,
            question,
        } => commands::ask::run(config_path, &username, &password, &question, cli.json).await?,
        Commands::HashPassword { password } => commands::hash_password::run(&password)?,
        Commands::Init => commands::init::run(config_path)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "ragguard",
            "--config",
            "/etc/ragguard.toml",
            "ask",
            "--username",
            "finance_user",
            "--password",
            "finance_pass",
            "What was Q1 revenue?",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/etc/ragguard.toml")));
        match cli.command {
            Commands::Ask {
                username, question, ..
            } => {
                assert_eq!(username, "finance_user");
                assert_eq!(question, "What was Q1 revenue?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn serve_port_override() {
        let cli = Cli::try_parse_from(["ragguard", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
    }
}
