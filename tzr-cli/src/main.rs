//! CLI for Trezor-style hardware wallets.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod device;
mod flow;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tzr::{DecodedResult, DerivationPath};

use crate::device::Endpoint;

#[derive(Parser)]
#[command(name = "tzr", version, about = "Talk to a hardware wallet over its framed protocol")]
struct Cli {
    /// Device link (tcp:HOST:PORT or unix:PATH).
    #[arg(long, short = 'c')]
    connect: Option<Endpoint>,

    /// JSON session configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read timeout in milliseconds (overrides the config file).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reset the device session.
    Init,

    /// Ask the device to echo a message.
    Ping {
        /// Text to echo.
        text: String,
    },

    /// Show the Bitcoin address at a derivation path.
    Address {
        /// BIP-32 derivation path.
        #[arg(long, default_value = "m/44'/0'/0'/0/0")]
        path: DerivationPath,
    },

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for replies.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable text.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

fn main() {
    env_logger::init();
    if let Err(e) = Cli::parse().dispatch() {
        eprintln!("tzr: {e:#}");
        std::process::exit(1);
    }
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        if let Command::Completion { shell } = self.command {
            clap_complete::generate(shell, &mut Self::command(), "tzr", &mut std::io::stdout());
            return Ok(());
        }

        let Some(endpoint) = &self.connect else {
            anyhow::bail!("no device link given (use --connect)");
        };
        let config = device::config(self.config.as_deref(), self.timeout_ms)?;
        let mut session = endpoint.open(&config)?;
        let mut pins = flow::prompt_pin;

        let init = flow::initialize(&mut session, &mut pins)?;
        let result = match &self.command {
            Command::Init => init,
            Command::Ping { text } => flow::run(&mut session, &mut pins, |s| s.ping(text))?,
            Command::Address { path } => {
                flow::run(&mut session, &mut pins, |s| s.get_address(path))?
            }
            Command::Completion { .. } => return Ok(()),
        };
        print(&result, self.format)
    }
}

fn print(result: &DecodedResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => println!("{}", result.message),
    }
    Ok(())
}
