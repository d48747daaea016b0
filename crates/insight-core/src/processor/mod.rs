pub mod dimensions;
pub mod zero_shot;

pub use dimensions::DimensionsProcessor;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::imageio::DecodedImage;
use crate::types::{ExtractMetadata, ImageInsight};

/// Turns one decoded image plus request metadata into an insight.
pub trait ImageProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn process(&self, image: &DecodedImage, metadata: &ExtractMetadata) -> Result<ImageInsight>;
}

/// Which processor the service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessorKind {
    /// Report image dimensions only.
    Dimensions,
    /// CLIP zero-shot classification; fails if the model cannot be loaded.
    ZeroShot,
    /// Zero-shot when the model loads, dimensions otherwise.
    #[default]
    Auto,
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensions => write!(f, "dimensions"),
            Self::ZeroShot => write!(f, "zero-shot"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ProcessorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dimensions" | "sample" => Ok(Self::Dimensions),
            "zero-shot" | "zeroshot" | "zero_shot" | "clip" => Ok(Self::ZeroShot),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown processor {other:?}; expected dimensions, zero-shot or auto"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            ProcessorKind::Dimensions,
            ProcessorKind::ZeroShot,
            ProcessorKind::Auto,
        ] {
            assert_eq!(kind.to_string().parse::<ProcessorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn kind_accepts_aliases() {
        assert_eq!("CLIP".parse::<ProcessorKind>().unwrap(), ProcessorKind::ZeroShot);
        assert_eq!("sample".parse::<ProcessorKind>().unwrap(), ProcessorKind::Dimensions);
        assert!("resnet".parse::<ProcessorKind>().is_err());
    }

    #[test]
    fn default_kind_is_auto() {
        assert_eq!(ProcessorKind::default(), ProcessorKind::Auto);
    }
}
