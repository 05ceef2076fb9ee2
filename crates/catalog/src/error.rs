use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the catalog crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors produced while loading a catalog feed.
#[derive(Debug)]
pub enum CatalogError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read catalog: {} ({source})", path.display())
            }
            Self::Parse {
                path: Some(path),
                source,
            } => write!(f, "invalid catalog feed at {} ({source})", path.display()),
            Self::Parse { path: None, source } => write!(f, "invalid catalog feed ({source})"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse { path: None, source }
    }
}
