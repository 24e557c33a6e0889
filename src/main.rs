//! rpc-gateway command line.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ──▶ routing ──▶ RpcRequest              │
//!                           │                                  │                   │
//!                           │                                  ▼                   │
//!                           │   interceptors.before ──▶ hijack | preprocess        │
//!                           │                                  │                   │
//!                           │                                  ▼                   │
//!                           │          switcher ──▶ binding ──▶ RPC client ────────┼──▶ RPC service
//!                           │                                  │                   │
//!                           │                                  ▼                   │
//!     Client Response       │   postprocess | marshal ──▶ interceptors.after       │
//!     ◀─────────────────────┼──────────────────────────────────┘                   │
//!                           └──────────────────────────────────────────────────────┘
//! ```
//!
//! The binary works on configuration only: `check` validates a config and
//! prints its route table, `generate` writes the dispatch table source for
//! the configured service. Serving requires a switcher and is done by the
//! embedding application through the library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use rpc_gateway::codegen::generate_switcher;
use rpc_gateway::config::load_config;
use rpc_gateway::observability::logging::init_logging;
use rpc_gateway::routing::RouteTable;

#[derive(Parser)]
#[command(name = "rpc-gateway")]
#[command(about = "HTTP form gateway for RPC services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and print its route table
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Generate <service.root>/gen/switcher.rs from a config file
    Generate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { config } => {
            let config = load_config(&config)?;
            init_logging(&config.observability);
            let table = RouteTable::from_config(&config.routes)?;
            println!("service {} ({} routes)", config.service.name, table.len());
            for entry in table.entries() {
                let methods: Vec<&str> = entry.methods.iter().map(|m| m.as_str()).collect();
                println!("  {:<16} {:<32} {}", methods.join(","), entry.path, entry.operation);
            }
        }
        Commands::Generate { config } => {
            let config = load_config(&config)?;
            init_logging(&config.observability);
            let path = generate_switcher(&config)?;
            println!("Generated {}", path.display());
        }
    }
    Ok(())
}
