use fareseer_core::config::{AppConfig, LoadOptions};
use fareseer_core::{LogisticBookingModel, PopularityLookup};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_classifier_artifact(&config));
            checks.push(check_popularity_artifact(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "classifier_artifact",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "popularity_artifact",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let any_fail = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let overall_status = if any_fail { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_fail {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_classifier_artifact(config: &AppConfig) -> DoctorCheck {
    let path = &config.artifacts.model_path;
    match LogisticBookingModel::load(path) {
        Ok(model) => DoctorCheck {
            name: "classifier_artifact",
            status: CheckStatus::Pass,
            details: format!("loaded `{}` from `{}`", model.name, path.display()),
        },
        Err(error) if config.artifacts.require_model => {
            DoctorCheck { name: "classifier_artifact", status: CheckStatus::Fail, details: error.to_string() }
        }
        Err(error) => DoctorCheck {
            name: "classifier_artifact",
            status: CheckStatus::Warn,
            details: format!("{error} (artifacts.require_model is false; predictions will be refused)"),
        },
    }
}

fn check_popularity_artifact(config: &AppConfig) -> DoctorCheck {
    let path = &config.artifacts.popularity_path;
    match PopularityLookup::load(path) {
        Ok(popularity) if !popularity.has_route_table() && !popularity.has_booking_origin_table() => {
            DoctorCheck {
                name: "popularity_artifact",
                status: CheckStatus::Warn,
                details: format!(
                    "no popularity tables at `{}`; popularity features will default to 0.0",
                    path.display()
                ),
            }
        }
        Ok(popularity) => DoctorCheck {
            name: "popularity_artifact",
            status: CheckStatus::Pass,
            details: format!(
                "{} routes and {} booking origins from `{}`",
                popularity.route_count(),
                popularity.booking_origin_count(),
                path.display()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "popularity_artifact", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
