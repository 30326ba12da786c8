use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use basket_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let sources = SourceLookup {
        doc: config_file_doc.as_ref(),
        path: config_file_path.as_deref(),
    };

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];

    lines.push(render_line(
        "artifacts.dir",
        &config.artifacts.dir.display().to_string(),
        sources.field_source(
            "artifacts.dir",
            &["BASKET_ARTIFACTS_DIR"],
            options.overrides.artifacts_dir.is_some(),
        ),
    ));
    lines.push(render_line(
        "recommend.top_k",
        &config.recommend.top_k.to_string(),
        sources.field_source(
            "recommend.top_k",
            &["BASKET_RECOMMEND_TOP_K"],
            options.overrides.top_k.is_some(),
        ),
    ));
    lines.push(render_line(
        "recommend.verbose",
        &config.recommend.verbose.to_string(),
        sources.field_source(
            "recommend.verbose",
            &["BASKET_RECOMMEND_VERBOSE"],
            options.overrides.verbose.is_some(),
        ),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        sources.field_source(
            "logging.level",
            &["BASKET_LOGGING_LEVEL", "BASKET_LOG_LEVEL"],
            options.overrides.log_level.is_some(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        sources.field_source(
            "logging.format",
            &["BASKET_LOGGING_FORMAT", "BASKET_LOG_FORMAT"],
            options.overrides.log_format.is_some(),
        ),
    ));

    lines.join("\n")
}

struct SourceLookup<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

impl SourceLookup<'_> {
    fn field_source(&self, key_path: &str, env_keys: &[&str], overridden: bool) -> String {
        if overridden {
            return "override (command line)".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = self.doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .path
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("basket.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/basket.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
