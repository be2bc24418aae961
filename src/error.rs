use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SceneError>;

/// Every failure the scene host can report.
///
/// Validation and resource errors are recovered per entity; shader and
/// context errors abort the owning surface (or the process).
#[derive(Error, Debug)]
pub enum SceneError {
    /// Top-level document structure is malformed. The load call fails and
    /// prior state is kept.
    #[error("document format error: {0}")]
    DocumentFormat(String),

    /// A single entity carries a bad field. That entity is skipped.
    #[error("invalid {entity}: {reason}")]
    EntityValidation { entity: String, reason: String },

    /// A mesh or texture file is missing or unreadable.
    #[error("failed to load resource {}: {reason}", path.display())]
    ResourceLoad { path: PathBuf, reason: String },

    #[error("shader compilation failed ({label}): {diagnostic}")]
    ShaderCompile { label: String, diagnostic: String },

    #[error("shader program link failed ({label}): {diagnostic}")]
    ShaderLink { label: String, diagnostic: String },

    /// Native window / rendering context failure.
    #[error("context error: {0}")]
    Context(String),

    /// Operation on a shape whose resources were already released.
    #[error("shape {0} has been released")]
    Released(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    pub fn validation(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EntityValidation {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn resource(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ResourceLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that only affect a single entity.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EntityValidation { .. } | Self::ResourceLoad { .. } | Self::Released(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_names_path() {
        let err = SceneError::resource("models/missing.obj", "not found");
        assert!(err.to_string().contains("models/missing.obj"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn context_errors_are_fatal() {
        assert!(!SceneError::Context("lost".into()).is_recoverable());
        assert!(!SceneError::ShaderLink {
            label: "main".into(),
            diagnostic: "mismatch".into()
        }
        .is_recoverable());
    }
}
