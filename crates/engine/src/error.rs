use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by slider configuration and preference storage.
///
/// Player readiness is never an error: operations that need a ready player
/// are skipped instead.
#[derive(Debug)]
pub enum EngineError {
    InvalidSliderBounds {
        min: f64,
        max: f64,
    },
    InvalidStep(f64),
    PreferenceIo {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    PreferenceSerialization {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSliderBounds { min, max } => {
                write!(f, "invalid slider bounds {min}..{max}")
            }
            Self::InvalidStep(step) => write!(f, "invalid slider step: {step}"),
            Self::PreferenceIo {
                context,
                path,
                source,
            } => write!(f, "{context}: {} ({source})", path.display()),
            Self::PreferenceSerialization { path, source } => {
                write!(
                    f,
                    "trim preference serialization/deserialization failed at {} ({source})",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PreferenceIo { source, .. } => Some(source),
            Self::PreferenceSerialization { source, .. } => Some(source),
            _ => None,
        }
    }
}
