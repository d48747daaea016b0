//! Image Insight Client
//!
//! Sends images to a running insight server and prints the JSON response.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use insight_core::imageio::{DEFAULT_MIME, file_to_data_url, read_file_bytes};
use insight_core::{ExtractMetadata, guess_mime};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Extraction endpoint, relative to the server address
const EXTRACT_ENDPOINT: &str = "/v2/image_insight/extract";

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "insight-client")]
#[command(about = "Query an image insight server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server address
    #[arg(short, long, env = "INSIGHT_SERVER", default_value = "http://0.0.0.0:8000")]
    server: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that the server is up
    Health,
    /// Extract insight from an image
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
struct ExtractArgs {
    /// Upload a local image
    #[arg(short, long, group = "source")]
    file: Option<PathBuf>,

    /// Let the server download an image
    #[arg(short, long, group = "source")]
    url: Option<String>,

    /// Send a local image as a base64 data URL
    #[arg(short, long, group = "source")]
    base64_file: Option<PathBuf>,

    /// Comma separated candidate labels
    #[arg(short, long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Extra metadata as a JSON object
    #[arg(short, long)]
    metadata: Option<String>,
}

/// Joins the server address and a path.
fn endpoint(server: &str, path: &str) -> String {
    format!("{}{}", server.trim_end_matches('/'), path)
}

/// Merges `--labels` into `--metadata` and checks the result.
fn build_metadata(labels: &[String], raw: Option<&str>) -> Result<String> {
    let mut metadata = ExtractMetadata::parse(raw.unwrap_or_default())
        .context("invalid --metadata")?;
    if !labels.is_empty() {
        metadata.labels = Some(labels.to_vec());
    }
    serde_json::to_string(&metadata).context("failed to encode metadata")
}

/// Builds the `file` part, typed by extension.
fn file_part(path: &Path) -> Result<Part> {
    let data = read_file_bytes(path)?;
    let mime = guess_mime(path).unwrap_or(DEFAULT_MIME);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    debug!(path = %path.display(), %mime, len = data.len(), "attaching file");
    Ok(Part::bytes(data).file_name(name).mime_str(mime)?)
}

fn build_form(args: &ExtractArgs) -> Result<Form> {
    let metadata = build_metadata(&args.labels, args.metadata.as_deref())?;
    let mut form = Form::new().part(
        "metadata",
        Part::text(metadata).mime_str("application/json")?,
    );

    if let Some(path) = &args.file {
        form = form.part("file", file_part(path)?);
    } else if let Some(url) = &args.url {
        form = form.text("url", url.clone());
    } else if let Some(path) = &args.base64_file {
        let (data_url, _) = file_to_data_url(path)
            .with_context(|| format!("failed to encode {}", path.display()))?;
        form = form.text("base64str", data_url);
    } else {
        bail!("one of --file, --url or --base64-file is required");
    }
    Ok(form)
}

/// Reads a JSON body, turning HTTP errors into their `detail`.
async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.context("invalid JSON response")?;
    if !status.is_success() {
        let detail = body
            .get("detail")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        bail!("{status}: {detail}");
    }
    Ok(body)
}

async fn run(cli: Cli) -> Result<Value> {
    let client = reqwest::Client::new();
    match cli.command {
        Commands::Health => {
            let url = endpoint(&cli.server, "/health");
            info!(%url, "checking health");
            read_json(client.get(&url).send().await?).await
        }
        Commands::Extract(args) => {
            let url = endpoint(&cli.server, EXTRACT_ENDPOINT);
            let form = build_form(&args)?;
            info!(%url, "sending extraction request");
            let response = client
                .post(&url)
                .header("accept", "application/json")
                .multipart(form)
                .send()
                .await?;
            read_json(response).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{text}"),
            Err(_) => println!("{body}"),
        },
        Err(e) => {
            println!("{}", json!({ "error": format!("{e:#}") }));
            std::process::exit(1);
        }
    }
}
