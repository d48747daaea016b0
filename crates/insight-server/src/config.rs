use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use insight_core::imageio::loader::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_DOWNLOAD_BYTES};
use insight_core::{FacadeConfig, ProcessorKind, ZeroShotConfig};

/// Default request body bound (100 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Default model directory.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("image-insight")
        .join("models")
        .join("clip-vit-base-patch32")
}

/// Server configuration, from flags or environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "insight-server")]
#[command(about = "Serve image insight extraction over HTTP")]
#[command(version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "INSIGHT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, env = "INSIGHT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Name shown by the welcome and health endpoints
    #[arg(long, env = "APP_NAME", default_value = "image insight app")]
    pub app_name: String,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "INSIGHT_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Processor to run: dimensions, zero-shot or auto
    #[arg(long, env = "INSIGHT_PROCESSOR", default_value_t = ProcessorKind::Auto)]
    pub processor: ProcessorKind,

    /// Directory holding model.safetensors and tokenizer.json
    #[arg(short = 'm', long, env = "INSIGHT_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Prompt template for zero-shot labels
    #[arg(long, env = "INSIGHT_PROMPT_TEMPLATE", default_value = "a photo of a {label}")]
    pub prompt_template: String,

    /// Multiplier applied to similarities before the softmax
    #[arg(long, env = "INSIGHT_LOGIT_SCALE", default_value_t = 1.0)]
    pub logit_scale: f32,

    /// Largest accepted remote image, in bytes
    #[arg(long, env = "INSIGHT_MAX_DOWNLOAD_BYTES", default_value_t = DEFAULT_MAX_DOWNLOAD_BYTES)]
    pub max_download_bytes: usize,

    /// Timeout for remote image downloads, in seconds
    #[arg(
        long,
        env = "INSIGHT_FETCH_TIMEOUT_SECS",
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs()
    )]
    pub fetch_timeout_secs: u64,

    /// Log filter directive
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl ServerConfig {
    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configured model directory, or [`default_model_dir`].
    pub fn model_dir(&self) -> PathBuf {
        self.model_dir.clone().unwrap_or_else(default_model_dir)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn facade_config(&self) -> FacadeConfig {
        FacadeConfig::new()
            .with_kind(self.processor)
            .with_model_dir(self.model_dir())
            .with_zero_shot(
                ZeroShotConfig::new()
                    .with_prompt_template(self.prompt_template.clone())
                    .with_logit_scale(self.logit_scale),
            )
    }
}
