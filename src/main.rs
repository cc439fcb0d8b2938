//! aesgcm - AES-GCM encryption from the command line
//!
//! Usage:
//!   aesgcm keygen [--size 16|24|32]  - Print a new random key as hex
//!   aesgcm encrypt <TEXT>            - Encrypt text with the configured key
//!   aesgcm decrypt <HEX>             - Decrypt a ciphertext with the configured key
//!
//! The key comes from the `--config` JSON file or the `AESGCM_KEY` variable.
//! `RUST_LOG` overrides the log level chosen by `--verbose`.

use std::path::PathBuf;
use std::process::ExitCode;

use aesgcm::aes::generate_key_for;
use aesgcm::config::CipherConfig;
use aesgcm::error::CryptoResult;
use aesgcm::KeySize;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aesgcm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AES-GCM encryption with hex-encoded ciphertext")]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random key
    Keygen {
        /// Key size in bytes (16, 24 or 32); defaults to the configured size
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Encrypt text and print hex(nonce || ciphertext || tag)
    Encrypt {
        /// Text to encrypt
        text: String,
    },

    /// Decrypt a hex ciphertext and print the text
    Decrypt {
        /// Ciphertext produced by `encrypt`
        ciphertext: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.suggested_remediation() {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Build the log filter; `RUST_LOG` directives take precedence over `--verbose`
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn run(cli: Cli) -> CryptoResult<()> {
    let config = match &cli.config {
        Some(path) => CipherConfig::load(path)?,
        None => CipherConfig::default(),
    }
    .with_env_overrides()?;

    match cli.command {
        Commands::Keygen { size } => {
            let key_size = match size {
                Some(size) => KeySize::from_len(size)?,
                None => config.key_size,
            };
            let key = generate_key_for(key_size)?;
            println!("{}", key.to_hex());
        }
        Commands::Encrypt { text } => {
            let cipher = config.build_cipher()?;
            println!("{}", cipher.encrypt(text.as_bytes())?);
        }
        Commands::Decrypt { ciphertext } => {
            let cipher = config.build_cipher()?;
            let plaintext = cipher.decrypt(ciphertext.trim())?;
            println!("{}", String::from_utf8_lossy(&plaintext));
        }
    }

    Ok(())
}
