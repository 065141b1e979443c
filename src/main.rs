//! forgemd: automates the Forge Model Derivative service.
//!
//! Set FORGE_CLIENT_ID, FORGE_CLIENT_SECRET and FORGE_API_PATH (a `.env` file works too).

use anyhow::Context;
use clap::{Parser, Subcommand};
use forgemd::{
    clean, Credentials, DerivativeFormat, ForgeClient, ObjExportOptions, ObjOutcome, PollOptions,
    Region, Unit, Urn, Workflow, WorkflowConfig,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "forgemd",
    about = "A utility to automate forge model derivative operations service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a source file, translate it to SVF2 and wait for completion
    Run {
        /// Input path of the source file
        input: PathBuf,
        /// Derivative service endpoint: us or emea
        #[arg(short, long, default_value = "us")]
        server: String,
        /// File storage region: us or emea
        #[arg(short, long, default_value = "us")]
        region: String,
        /// Target storage region for resulting derivatives: us or emea
        #[arg(short, long, default_value = "us")]
        target: String,
        /// Local directory for downloaded files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Seconds between manifest polls
        #[arg(long, default_value = "2")]
        poll_interval: u64,
        /// Give up polling after this many seconds, 0 waits forever
        #[arg(long, default_value = "3600")]
        timeout: u64,
    },
    /// Request OBJ output for a URN, or download it once complete
    Obj {
        /// Derivative URN
        #[arg(short, long)]
        urn: String,
        #[arg(short, long, default_value = "us")]
        server: String,
        #[arg(short, long, default_value = "us")]
        target: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Length unit of the exported geometry
        #[arg(long, default_value = "meter")]
        unit: Unit,
        /// Scene object ids to export
        #[arg(long, value_delimiter = ',', default_value = "1526,1527")]
        object_ids: Vec<i64>,
    },
    /// Request STL output for a URN
    Stl {
        #[arg(short, long)]
        urn: String,
        #[arg(short, long, default_value = "us")]
        server: String,
        #[arg(short, long, default_value = "us")]
        target: String,
    },
    /// Show manifest progress of a URN
    Status {
        #[arg(short, long)]
        urn: String,
        #[arg(short, long, default_value = "us")]
        server: String,
    },
    /// Clean up the derivative manifest and the storage bucket
    Clean {
        /// Derivative URN you would like to clean up
        #[arg(short, long)]
        urn: String,
        #[arg(short, long, default_value = "us")]
        server: String,
    },
    /// Print the object identifier encoded in a URN
    Decode {
        urn: String,
    },
}

/// `RUST_LOG` directives, defaulting to `info`.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing, writing human-readable progress to stdout.
///
/// Call after loading `.env` so a `RUST_LOG` set there takes effect.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .init();
}

/// Cancels `token` on Ctrl-C so polling stops cleanly.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            server,
            region,
            target,
            output,
            poll_interval,
            timeout,
        } => {
            let poll = PollOptions {
                interval: Duration::from_secs(poll_interval),
                timeout: (timeout > 0).then(|| Duration::from_secs(timeout)),
                ..Default::default()
            };
            cancel_on_ctrl_c(poll.cancel.clone());
            let config =
                WorkflowConfig::new(input, &server, &region, &target, output)?.with_poll(poll);
            let credentials = Credentials::from_env()?;

            let urn = Workflow::new(config, credentials)
                .run()
                .await
                .context("Workflow failed")?;
            println!("{}", urn);
        }
        Commands::Obj {
            urn,
            server,
            target,
            output,
            unit,
            object_ids,
        } => {
            let urn = Urn::parse(&urn)?;
            let config = WorkflowConfig::for_existing(&server, &target, output)?
                .with_obj(ObjExportOptions { unit, object_ids });
            let credentials = Credentials::from_env()?;

            match Workflow::new(config, credentials).generate_obj(&urn).await? {
                ObjOutcome::Downloaded(files) => {
                    for file in files {
                        println!("{}", file.display());
                    }
                }
                ObjOutcome::Pending(progress) => println!("OBJ translation: {}", progress),
                ObjOutcome::TranslationRequested => println!("OBJ translation requested"),
                ObjOutcome::MetadataUnavailable => println!("Model metadata is not available yet"),
            }
        }
        Commands::Stl {
            urn,
            server,
            target,
        } => {
            let urn = Urn::parse(&urn)?;
            let config = WorkflowConfig::for_existing(&server, &target, ".")?;
            let credentials = Credentials::from_env()?;
            let response = Workflow::new(config, credentials)
                .request_format(&urn, &DerivativeFormat::Stl)
                .await?;
            println!("STL translation: {}", response.result);
        }
        Commands::Status { urn, server } => {
            let urn = Urn::parse(&urn)?;
            let region = Region::resolve(&server)?;
            let client = ForgeClient::authenticate(&Credentials::from_env()?).await?;
            match client.manifest(&urn, region).await? {
                Some(manifest) => {
                    println!(
                        "{}: {}",
                        urn,
                        manifest.progress.as_deref().unwrap_or("unknown")
                    );
                    for node in &manifest.derivatives {
                        println!(
                            "  {}: {}",
                            node.output_type.as_deref().unwrap_or("?"),
                            node.progress.as_deref().unwrap_or("unknown")
                        );
                    }
                }
                None => println!("{}: no manifest", urn),
            }
        }
        Commands::Clean { urn, server } => {
            let urn = Urn::parse(&urn)?;
            let region = Region::resolve(&server)?;
            let report = clean(&Credentials::from_env()?, &urn, region).await?;
            println!(
                "manifest deleted: {}, bucket deleted: {}",
                report.manifest_deleted, report.container_deleted
            );
        }
        Commands::Decode { urn } => {
            println!("{}", Urn::parse(&urn)?.decode()?);
        }
    }

    Ok(())
}
