use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use http::Method;
use tracing_subscriber::EnvFilter;
use vidlink::{ApiRequest, ClientConfig};
use vidlink_core::{Clock, FixedClock, FixedNonce, NonceSource, RandomNonce, SystemClock};
use vidlink_session::Bootstrapper;
use vidlink_sign::{Signer, sign_canonical};

/// Used when `RUST_LOG` is unset. Covers every `vidlink*` crate.
const DEFAULT_LOG_FILTER: &str = "vidlink=info";

#[derive(Debug, Parser)]
#[command(name = "vidlink", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
struct App {
    /// Path to the TOML configuration file.
    #[arg(long, short, global = true, default_value = "vidlink.toml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one session bootstrap and print the session id.
    #[command(alias = "b")]
    Bootstrap,
    /// Send a signed request and print the response.
    #[command(alias = "r")]
    Request(RequestArgs),
    /// Compute a signature offline.
    #[command(alias = "s")]
    Sign(SignArgs),
}

#[derive(Debug, Args)]
struct RequestArgs {
    /// HTTP method, e.g. GET or POST.
    method: String,
    /// Path relative to `base_url`, already percent-encoded.
    path: String,
    #[arg(long, short)]
    query: Option<String>,
    /// Raw request body.
    #[arg(long, short)]
    body: Option<String>,
}

#[derive(Debug, Args)]
struct SignArgs {
    #[arg(long)]
    secret: String,
    #[arg(long, default_value = "GET")]
    method: String,
    #[arg(long)]
    path: String,
    #[arg(long)]
    query: Option<String>,
    #[arg(long, default_value = "")]
    body: String,
    /// Unix seconds; defaults to now.
    #[arg(long)]
    timestamp: Option<u64>,
    /// Defaults to a random nonce.
    #[arg(long)]
    nonce: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    match app.cmd {
        Commands::Bootstrap => bootstrap(&app.config).await,
        Commands::Request(args) => request(&app.config, args).await,
        Commands::Sign(args) => sign(args),
    }
}

fn load(path: &Path) -> Result<ClientConfig> {
    ClientConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

async fn bootstrap(path: &Path) -> Result<()> {
    let config = load(path)?;
    let bootstrapper = config.bootstrapper(config.build_reqwest()?);
    let session = bootstrapper.bootstrap().await?;

    let ttl = session.remaining_at(SystemTime::now());
    println!("session_id: {}", session.session_id());
    println!("expires_in: {}s", ttl.as_secs());
    Ok(())
}

async fn request(path: &Path, args: RequestArgs) -> Result<()> {
    let client = load(path)?.build()?;

    let method = Method::from_bytes(args.method.as_bytes()).context("invalid HTTP method")?;
    let mut req = ApiRequest::new(method, args.path);
    if let Some(query) = args.query {
        req = req.query(query);
    }
    if let Some(body) = args.body {
        req = req.header("Content-Type", "application/json").body(body);
    }

    let response = client.send(&req).await?;
    println!("{}", response.status);
    println!("{}", response.text());
    Ok(())
}

fn sign(args: SignArgs) -> Result<()> {
    let clock: Arc<dyn Clock> = match args.timestamp {
        Some(ts) => Arc::new(FixedClock::at_unix(ts)),
        None => Arc::new(SystemClock),
    };
    let nonce: Arc<dyn NonceSource> = match args.nonce {
        Some(n) => Arc::new(FixedNonce(n)),
        None => Arc::new(RandomNonce),
    };

    let signer = Signer::new(clock, nonce);
    let ctx = signer.context(&args.method, &args.path, args.query.as_deref(), args.body.as_bytes());
    let canonical = ctx.canonical_string();
    let signature = sign_canonical(&args.secret, &canonical)?;

    println!("canonical:\n{canonical}\n");
    println!("X-Timestamp: {}", ctx.timestamp);
    println!("X-Nonce: {}", ctx.nonce);
    println!("X-Signature: {signature}");
    Ok(())
}
