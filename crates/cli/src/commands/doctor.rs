use serde::Serialize;
use storefront_client::HttpStorefrontApi;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::CatalogCache;

use crate::commands::{command_runtime, CommandResult, EXIT_CONFIG, EXIT_TRANSPORT};

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
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let (report, exit_code) = build_report(options);

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

fn build_report(options: &LoadOptions) -> (DoctorReport, u8) {
    let mut checks = Vec::new();
    let mut exit_code = 0;

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let reachability = check_catalog_reachability(&config);
            if reachability.status == CheckStatus::Fail {
                exit_code = EXIT_TRANSPORT;
            }
            checks.push(reachability);
        }
        Err(error) => {
            exit_code = EXIT_CONFIG;
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_reachability",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    (DoctorReport { overall_status, summary, checks }, exit_code)
}

fn check_catalog_reachability(config: &AppConfig) -> DoctorCheck {
    let fail = |details: String| DoctorCheck {
        name: "catalog_reachability",
        status: CheckStatus::Fail,
        details,
    };

    let api = match HttpStorefrontApi::from_config(&config.api) {
        Ok(api) => api,
        Err(error) => return fail(error.to_string()),
    };
    let runtime = match command_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return fail(format!("failed to initialize async runtime: {error}")),
    };

    let mut catalog = CatalogCache::default();
    match runtime.block_on(catalog.load(&api)) {
        Ok(count) => DoctorCheck {
            name: "catalog_reachability",
            status: CheckStatus::Pass,
            details: format!("{count} products served by `{}`", config.api.base_url),
        },
        Err(error) => fail(format!("failed to load catalog: {error}")),
    }
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

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
