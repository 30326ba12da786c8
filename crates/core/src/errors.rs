use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("could not read artifact `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse artifact `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("invalid artifact `{artifact}`: {message}")]
    Invalid { artifact: &'static str, message: String },
}

impl ArtifactError {
    pub fn invalid(artifact: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { artifact, message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Artifacts(#[from] ArtifactError),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Artifacts(_) => "artifact_load",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Artifacts(_) => 3,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Run `basket config` to inspect it.",
            Self::Artifacts(_) => {
                "Model artifacts could not be loaded. Run `basket doctor` for details."
            }
        }
    }
}
