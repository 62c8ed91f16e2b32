mod cmd_delete;
mod cmd_read;
mod cmd_set;
mod cmd_validate;
mod cmd_verify;
mod value_arg;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use value_arg::ValueType;

#[derive(Parser, Debug)]
#[command(name = "prefstate")]
#[command(about = "Converge declared values into preference documents, idempotently")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory holding the documents (default: ~/.prefstate)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Converge a value into a document (writes only when needed)
    Set {
        /// Document domain, e.g. com.example.calendar
        domain: String,

        /// Entry path, e.g. AppleFirstWeekday:gregorian
        path: String,

        /// Desired value, parsed according to --type
        value: String,

        /// Type of the desired value
        #[arg(long = "type", value_enum, default_value = "string")]
        value_type: ValueType,
    },
    /// Print the value at a path
    Read {
        domain: String,
        path: String,
    },
    /// Remove the entry at a path (no-op when absent)
    Delete {
        domain: String,
        path: String,
    },
    /// Cross-check a persisted value through an external query tool
    Verify {
        domain: String,
        path: String,

        /// Expected value, parsed according to --type
        value: String,

        /// Type of the expected value
        #[arg(long = "type", value_enum, default_value = "string")]
        value_type: ValueType,

        /// Query tool to invoke (receives domain and path as arguments)
        #[arg(long)]
        tool: String,

        /// Fixed leading argument for the tool (repeatable)
        #[arg(long = "tool-arg")]
        tool_args: Vec<String>,
    },
    /// Decode a document and report its shape
    Validate {
        domain: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Set {
            domain,
            path,
            value,
            value_type,
        } => cmd_set::run(cli.root, &domain, &path, value_type, &value, cli.pretty),
        Commands::Read { domain, path } => cmd_read::run(cli.root, &domain, &path, cli.pretty),
        Commands::Delete { domain, path } => {
            cmd_delete::run(cli.root, &domain, &path, cli.pretty)
        }
        Commands::Verify {
            domain,
            path,
            value,
            value_type,
            tool,
            tool_args,
        } => {
            if cli.root.is_some() {
                anyhow::bail!("--root does not apply to verify; the query tool reads its own state");
            }
            cmd_verify::run(
                &domain,
                &path,
                value_type,
                &value,
                &tool,
                &tool_args,
                cli.pretty,
            )
        }
        Commands::Validate { domain } => cmd_validate::run(cli.root, &domain),
    }
}
