mod commands;
mod utils;

use clap::{Parser, Subcommand};
use clo_provider::{AUTH_TOKEN_ENV, AUTH_URL_ENV};
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "clo")]
#[command(about = "Declarative management of CLO cloud resources", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// URI of the CLO API
    #[arg(long, global = true, env = AUTH_URL_ENV)]
    auth_url: Option<String>,

    /// API token
    #[arg(long, global = true, env = AUTH_TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Directory holding the .clo state directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update a resource from an attribute file
    Apply {
        /// Resource type, e.g. clo_disks_volume
        resource_type: String,
        /// Name of the resource in the state
        name: String,
        /// JSON object with the resource attributes
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a resource and forget it
    Destroy {
        /// Resource type
        resource_type: String,
        /// Name of the resource in the state
        name: String,
    },
    /// Re-read every resource in the state
    Refresh,
    /// Run a data source and print the result
    Read {
        /// Data source name, e.g. clo_projects
        data_source: String,
        /// JSON object with the arguments
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Single argument; values are parsed as JSON and fall back to strings
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Print sensitive values instead of masking them
        #[arg(long)]
        show_sensitive: bool,
    },
    /// Describe the attributes of a resource or data source
    Schema {
        /// Type name; lists everything when omitted
        name: Option<String>,
        /// Look the name up among data sources
        #[arg(long)]
        data: bool,
    },
    /// Inspect the local state
    #[command(subcommand)]
    State(StateCommands),
}

#[derive(Subcommand)]
pub(crate) enum StateCommands {
    /// List tracked resources
    List,
    /// Show the attributes of one resource
    Show {
        /// Resource type
        resource_type: String,
        /// Name of the resource in the state
        name: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, cancelling pending waits...".yellow());
            on_interrupt.cancel();
        }
    });

    let root = cli.dir.clone();
    match cli.command {
        Commands::Apply {
            ref resource_type,
            ref name,
            ref file,
        } => {
            let provider = utils::provider(&cli, cancel)?;
            commands::apply::handle(&provider, &root, resource_type, name, file).await?;
        }
        Commands::Destroy {
            ref resource_type,
            ref name,
        } => {
            let provider = utils::provider(&cli, cancel)?;
            commands::destroy::handle(&provider, &root, resource_type, name).await?;
        }
        Commands::Refresh => {
            let provider = utils::provider(&cli, cancel)?;
            commands::refresh::handle(&provider, &root).await?;
        }
        Commands::Read {
            ref data_source,
            ref file,
            ref set,
            show_sensitive,
        } => {
            // Fail on a bad name before asking for credentials
            clo_provider::find_data_source(data_source)?;
            let args = utils::read_arguments(file.as_deref(), set)?;
            let provider = utils::provider(&cli, cancel)?;
            commands::read::handle(&provider, data_source, args, show_sensitive).await?;
        }
        Commands::Schema { ref name, data } => {
            commands::schema::handle(name.as_deref(), data)?;
        }
        Commands::State(cmd) => {
            commands::state::handle(cmd, &root).await?;
        }
    }

    Ok(())
}
