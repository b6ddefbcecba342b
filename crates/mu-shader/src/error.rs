use std::path::PathBuf;

/// Failures while loading shader assets.
///
/// Validation findings are not errors; they are [`crate::validate::Diagnostic`]s.
/// This type covers the cases where there is nothing to diagnose because the
/// asset could not even be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid program manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: mu_glsl::ParseError,
    },

    #[error("cannot determine shader stage from the extension of {}", path.display())]
    Stage { path: PathBuf },
}
