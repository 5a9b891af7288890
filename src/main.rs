//! selfsign CLI
//!
//! `selfsign generate` (also the default with no subcommand) writes
//! `certificate.pem` and `private_key.pem`; every parameter can be set by flag
//! or TOML file. `selfsign verify` checks an existing pair.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use selfsign::configs::GeneratorConfig;
use selfsign::generate_self_signed::{generate, generate_with_subject};
use selfsign::persist::{persist, PersistOptions};
use selfsign::subject::SubjectName;
use selfsign::verify::{
    load_certificate_pem, load_private_key_pem, verify_key_certificate_pair, CertificateSummary,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "selfsign")]
#[command(about = "Generate a self-signed RSA certificate and PKCS#8 private key", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair and self-signed certificate (default)
    Generate(GenerateArgs),

    /// Check that a certificate is self-signed by the given private key
    Verify {
        /// Certificate file
        #[arg(long, default_value = "certificate.pem")]
        cert: PathBuf,

        /// Private key file
        #[arg(long, default_value = "private_key.pem")]
        key: PathBuf,
    },
}

#[derive(clap::Args, Default)]
struct GenerateArgs {
    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// RSA modulus size in bits (2048, 3072 or 4096)
    #[arg(long)]
    key_size: Option<u32>,

    /// RSA public exponent
    #[arg(long)]
    exponent: Option<u32>,

    /// Subject, e.g. "CN=example.com,O=Example Organization,C=US"
    #[arg(long)]
    subject: Option<String>,

    /// Validity in days (must be at least 1)
    #[arg(long)]
    days: Option<u32>,

    /// Certificate output path
    #[arg(long)]
    cert_out: Option<PathBuf>,

    /// Private key output path
    #[arg(long)]
    key_out: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Generate(args)) => run_generate(args),
        Some(Commands::Verify { cert, key }) => run_verify(cert, key),
        None => run_generate(GenerateArgs::default()),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path).context("Failed to load configuration")?,
        None => GeneratorConfig::default(),
    };
    if let Some(size) = args.key_size {
        config.key.size = size;
    }
    if let Some(exponent) = args.exponent {
        config.key.exponent = exponent;
    }
    if let Some(days) = args.days {
        config.validity.days = days;
    }
    if let Some(path) = args.cert_out {
        config.output.certificate_path = path;
    }
    if let Some(path) = args.key_out {
        config.output.private_key_path = path;
    }
    config.output.overwrite |= args.force;

    let generated = match &args.subject {
        Some(s) => {
            let subject = s.parse::<SubjectName>().context("Invalid --subject")?;
            generate_with_subject(&config, subject, &mut OsRng)
        }
        None => generate(&config, &mut OsRng),
    }
    .context("Failed to generate certificate")?;

    let paths = persist(
        &generated,
        &config.output.certificate_path,
        &config.output.private_key_path,
        PersistOptions {
            overwrite: config.output.overwrite,
        },
    )
    .context("Failed to write certificate and private key")?;

    // Read back what landed on disk before declaring success
    let certificate = load_certificate_pem(&paths.certificate_path)?;
    let private_key = load_private_key_pem(&paths.private_key_path)?;
    verify_key_certificate_pair(&private_key, &certificate)
        .context("Written certificate and private key do not match")?;

    println!("Certificate and private key generated successfully.");
    Ok(())
}

fn run_verify(cert: PathBuf, key: PathBuf) -> Result<()> {
    let certificate = load_certificate_pem(&cert)?;
    let private_key = load_private_key_pem(&key)?;
    verify_key_certificate_pair(&private_key, &certificate)
        .context("Key and certificate pair verification failed")?;

    let summary = CertificateSummary::from_certificate(&certificate)?;
    println!("✓ {} is self-signed by {}", cert.display(), key.display());
    println!("  Subject:    {}", summary.subject);
    println!("  Serial:     {}", summary.serial);
    println!("  Not before: {}", summary.not_before);
    println!("  Not after:  {}", summary.not_after);
    println!("  Key size:   {} bits", summary.key_bits);
    Ok(())
}
