use std::time::Instant;

use basket_core::config::{AppConfig, LoadOptions};
use basket_core::{AisleRecommender, ArtifactBundle, ArtifactSummary, ProductId, DEMO_CART};
use serde::Serialize;

use crate::commands::{escape_json, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    elapsed_ms: u64,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<ArtifactSummary>,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();
    let mut artifacts = None;

    let started = Instant::now();
    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                elapsed_ms: elapsed_ms(started),
                details: "configuration loaded and validated".to_string(),
            });

            let started = Instant::now();
            match ArtifactBundle::load(&config.artifacts.dir) {
                Ok(bundle) => {
                    let summary = bundle.summary();
                    checks.push(DoctorCheck {
                        name: "artifact_load",
                        status: CheckStatus::Pass,
                        elapsed_ms: elapsed_ms(started),
                        details: format!(
                            "loaded {} aisles, {} products, {} clusters, {} aggregate rules from `{}`",
                            summary.aisles,
                            summary.products,
                            summary.clusters,
                            summary.aggregate_rules,
                            config.artifacts.dir.display()
                        ),
                    });
                    artifacts = Some(summary);
                    checks.push(check_demo_recommendation(bundle, config.recommend.top_k));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "artifact_load",
                        status: CheckStatus::Fail,
                        elapsed_ms: elapsed_ms(started),
                        details: error.to_string(),
                    });
                    checks.push(skipped("demo_recommendation", "artifacts did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                elapsed_ms: elapsed_ms(started),
                details: error.to_string(),
            });
            checks.push(skipped("artifact_load", "configuration did not load"));
            checks.push(skipped("demo_recommendation", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, artifacts, checks }
}

fn check_demo_recommendation(bundle: ArtifactBundle, top_k: usize) -> DoctorCheck {
    let started = Instant::now();
    let recommender = AisleRecommender::new(bundle);
    let cart: Vec<ProductId> = DEMO_CART.iter().copied().map(ProductId).collect();
    let aisles = recommender.recommend_aisles(&cart, top_k, false);

    DoctorCheck {
        name: "demo_recommendation",
        status: CheckStatus::Pass,
        elapsed_ms: elapsed_ms(started),
        details: if aisles.is_empty() {
            "demo cart produced no recommendations".to_string()
        } else {
            format!("demo cart recommended {}", aisles.join(", "))
        },
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        elapsed_ms: 0,
        details: format!("skipped because {reason}"),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    if let Some(fingerprint) = report.artifacts.as_ref().and_then(|summary| summary.fingerprint.as_ref())
    {
        lines.push(format!("artifact fingerprint: {fingerprint}"));
    }

    lines.join("\n")
}
