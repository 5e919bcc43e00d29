//! baofu: operator tool for the gateway envelope and signature codecs.

use anyhow::{bail, Context, Result};
use baofu_sdk_core::{
    crypto::{self, raw::max_block_input},
    envelope::DECRYPT_CHUNK_FACTOR,
    EnvelopeOps, KeyMaterial, VerifyMode,
};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "baofu")]
#[command(author, version, about = "Baofu gateway envelope and signature tool")]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a request body into envelope hex
    Encrypt {
        /// Merchant private key (PKCS#1 or PKCS#8 PEM)
        #[arg(short, long)]
        key: PathBuf,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Decrypt envelope hex from the gateway
    Decrypt {
        /// Gateway certificate or public key PEM
        #[arg(short, long)]
        cert: PathBuf,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Sign a payload with SHA-256 RSA
    Sign {
        /// Merchant private key (PKCS#1 or PKCS#8 PEM)
        #[arg(short, long)]
        key: PathBuf,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Verify a hex signature over a payload
    Verify {
        /// Gateway certificate or public key PEM
        #[arg(short, long)]
        cert: PathBuf,

        /// Hex signature
        #[arg(short, long)]
        signature: String,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Report a mismatch without failing
        #[arg(long)]
        lenient: bool,
    },

    /// Print the public key of a certificate as a PUBLIC KEY PEM
    ConvertCert {
        /// Certificate or public key PEM
        #[arg(short, long)]
        cert: PathBuf,
    },

    /// Show key size and segmentation parameters
    Inspect {
        /// Private key PEM
        #[arg(short, long, conflicts_with = "cert", required_unless_present = "cert")]
        key: Option<PathBuf>,

        /// Certificate or public key PEM
        #[arg(short, long)]
        cert: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Encrypt { key, input } => {
            let ops = ops_with_private_key(&key)?;
            let envelope = ops.encrypt(&read_input(input.as_deref())?)?;
            println!("{envelope}");
        }
        Commands::Decrypt { cert, input } => {
            let ops = ops_with_public_key(&cert, VerifyMode::Strict)?;
            let input = read_input(input.as_deref())?;
            let envelope = String::from_utf8(input).context("envelope is not ASCII hex")?;
            let plaintext = ops.decrypt(&envelope)?;
            std::io::stdout()
                .write_all(&plaintext)
                .context("failed to write plaintext")?;
        }
        Commands::Sign { key, input } => {
            let ops = ops_with_private_key(&key)?;
            println!("{}", ops.sign(&read_input(input.as_deref())?)?);
        }
        Commands::Verify {
            cert,
            signature,
            input,
            lenient,
        } => {
            let mode = if lenient {
                VerifyMode::Lenient
            } else {
                VerifyMode::Strict
            };
            let ops = ops_with_public_key(&cert, mode)?;
            let payload = read_input(input.as_deref())?;

            return match ops.check_response(&payload, &signature) {
                Ok(true) => {
                    println!("valid");
                    Ok(ExitCode::SUCCESS)
                }
                Ok(false) => {
                    println!("invalid");
                    Ok(ExitCode::SUCCESS)
                }
                Err(baofu_sdk_core::BaofuError::SignatureMismatch) => {
                    println!("invalid");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            };
        }
        Commands::ConvertCert { cert } => {
            let keys = KeyMaterial::from_pem(None, Some(&read_file(&cert)?))?;
            print!("{}", keys.public_key_pem()?);
        }
        Commands::Inspect { key, cert } => {
            let modulus_bytes = match (key, cert) {
                (Some(key), _) => {
                    let private = crypto::parse_private_key_pem(&read_file(&key)?)?;
                    crypto::key_size_bytes(&private)
                }
                (None, Some(cert)) => {
                    let public = crypto::parse_public_key_pem(&read_file(&cert)?)?;
                    crypto::key_size_bytes(&public)
                }
                (None, None) => bail!("either --key or --cert is required"),
            };

            println!("modulus:            {} bits", modulus_bytes * 8);
            match max_block_input(modulus_bytes) {
                Some(block) => println!("encrypt segment:    {block} Base64 bytes"),
                None => println!("encrypt segment:    key too small"),
            }
            println!(
                "decrypt chunk:      {} hex chars",
                modulus_bytes * DECRYPT_CHUNK_FACTOR
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn ops_with_private_key(path: &Path) -> Result<EnvelopeOps> {
    let keys = KeyMaterial::from_pem(Some(&read_file(path)?), None)?;
    tracing::debug!(
        path = %path.display(),
        bits = crypto::key_size_bytes(keys.private_key()?) * 8,
        "private key loaded"
    );
    Ok(EnvelopeOps::new(keys, VerifyMode::Strict))
}

fn ops_with_public_key(path: &Path, mode: VerifyMode) -> Result<EnvelopeOps> {
    let keys = KeyMaterial::from_pem(None, Some(&read_file(path)?))?;
    tracing::debug!(
        path = %path.display(),
        bits = crypto::key_size_bytes(keys.public_key()?) * 8,
        ?mode,
        "public key loaded"
    );
    Ok(EnvelopeOps::new(keys, mode))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    let input = match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    tracing::debug!(len = input.len(), stdin = path.is_none(), "input read");
    Ok(input)
}
