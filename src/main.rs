//! apidoc: generate API documentation from annotated controller definitions.
//!
//! - `apidoc doc controllers/ -o api.md`: render the document
//! - `apidoc routes controllers/`: print the alias routes a router would get

use anyhow::{bail, Context, Result};
use apidoc::discovery::DEFAULT_NAMESPACE;
use apidoc::render;
use apidoc::route::RouteTable;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "apidoc",
    about = "Generate API documentation from annotated controller definitions"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the API document for every controller under PATH
    Doc {
        /// Controller definition file or directory
        path: PathBuf,

        /// Output file. Writes to stdout if omitted.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format: markdown (default), json
        #[arg(short = 'f', long, default_value = "markdown")]
        format: String,

        /// Namespace trimmed from controller identities when deriving paths
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
    /// Print the alias routes for endpoints declaring their own request path
    Routes {
        /// Controller definition file or directory
        path: PathBuf,

        /// Namespace trimmed from controller identities when deriving paths
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Doc {
            path,
            output,
            format,
            namespace,
        } => doc(&path, output.as_deref(), &format, &namespace),
        Command::Routes { path, namespace } => routes(&path, &namespace),
    }
}

/// Logs go to stderr so documents on stdout stay clean. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn doc(path: &Path, output: Option<&Path>, format: &str, namespace: &str) -> Result<()> {
    ensure_exists(path)?;
    let renderer = render::create_renderer(format)?;
    let document = apidoc::scan_to_doc(path, namespace, renderer.as_ref())
        .with_context(|| format!("failed to document {}", path.display()))?;

    match output {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(out, &document)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(output = %out.display(), "document written");
        }
        None => print!("{}", document),
    }
    Ok(())
}

fn routes(path: &Path, namespace: &str) -> Result<()> {
    ensure_exists(path)?;
    let mut table = RouteTable::default();
    let added = apidoc::mapping_router(&mut table, path, namespace)
        .with_context(|| format!("failed to collect routes from {}", path.display()))?;
    info!(routes = added, "alias routes collected");
    print!("{}", table.render());
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("path does not exist: {}", path.display());
    }
    Ok(())
}
