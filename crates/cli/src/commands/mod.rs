pub mod config;
pub mod demo;
pub mod doctor;
pub mod recommend;

use basket_core::config::{AppConfig, LoadOptions};
use basket_core::{AisleRecommender, ApplicationError, ArtifactBundle};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

/// Loads config, installs logging and builds the recommender from the
/// configured artifact directory.
pub(crate) fn load_recommender(
    options: &LoadOptions,
) -> Result<(AppConfig, AisleRecommender), ApplicationError> {
    let config = AppConfig::load(options.clone())?;
    crate::logging::init(&config);
    let artifacts = ArtifactBundle::load(&config.artifacts.dir)?;
    Ok((config, AisleRecommender::new(artifacts)))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

pub(crate) fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
