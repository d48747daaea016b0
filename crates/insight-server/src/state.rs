use std::sync::Arc;

use anyhow::{Context, Result};
use insight_core::{ImageLoader, InsightFacade};
use tracing::info;

use crate::config::ServerConfig;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub facade: Arc<InsightFacade>,
    pub loader: ImageLoader,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        app_name: impl Into<Arc<str>>,
        facade: InsightFacade,
        loader: ImageLoader,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            facade: Arc::new(facade),
            loader,
            max_body_bytes,
        }
    }

    /// Loads the processor and builds the download client.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let facade = InsightFacade::new(config.facade_config())
            .context("failed to initialise image processor")?;
        info!(
            processor = facade.processor_name(),
            kind = %facade.kind(),
            "image processor ready"
        );

        let loader = ImageLoader::new(config.max_download_bytes, config.fetch_timeout())
            .context("failed to build download client")?;

        Ok(Self::new(
            config.app_name.as_str(),
            facade,
            loader,
            config.max_body_bytes,
        ))
    }
}
