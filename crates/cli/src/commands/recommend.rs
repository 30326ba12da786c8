use basket_core::config::LoadOptions;
use basket_core::{ProductId, Recommendation, RecommendationRequest, RuleSource};
use serde::Serialize;

use crate::commands::{escape_json, load_recommender, CommandResult};

#[derive(Debug, Serialize)]
struct RecommendReport<'a> {
    command: &'static str,
    status: &'static str,
    product_ids: &'a [u64],
    top_k: usize,
    recommended: Vec<String>,
    details: &'a Recommendation,
}

/// `top_k` from the command line applies to this request only and is not
/// held to the configured default's range.
pub fn run(
    options: &LoadOptions,
    product_ids: &[u64],
    top_k: Option<usize>,
    json_output: bool,
) -> CommandResult {
    let (config, recommender) = match load_recommender(options) {
        Ok(loaded) => loaded,
        Err(error) => return CommandResult::from_error("recommend", &error),
    };

    let request = RecommendationRequest::new(product_ids.iter().copied().map(ProductId))
        .with_top_k(top_k.unwrap_or(config.recommend.top_k))
        .with_verbose(config.recommend.verbose);
    let recommendation = recommender.recommend(&request);

    let output = if json_output {
        let report = RecommendReport {
            command: "recommend",
            status: "ok",
            product_ids,
            top_k: request.top_k,
            recommended: recommendation.labels(),
            details: &recommendation,
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"recommend\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&recommendation)
    };

    CommandResult { exit_code: 0, output }
}

pub(crate) fn render_human(recommendation: &Recommendation) -> String {
    if let Some(reason) = recommendation.empty_reason {
        return format!("no recommendations: {}", reason.description());
    }

    let mut lines = Vec::with_capacity(recommendation.aisles.len() + 1);
    if let Some(segment) = recommendation.trace.segment {
        lines.push(format!("segment {segment}:"));
    }
    for (rank, entry) in recommendation.aisles.iter().enumerate() {
        let source = match entry.source {
            RuleSource::Segment => "segment",
            RuleSource::Aggregate => "aggregate",
        };
        lines.push(format!("{}. {} (lift {:.2}, {source} rules)", rank + 1, entry.aisle, entry.lift));
    }

    lines.join("\n")
}
