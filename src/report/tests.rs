use super::*;
use crate::error::{AppError, FailureKind, ValidationError};
use crate::metrics::LatencyStats;
use std::collections::BTreeMap;
use std::time::Duration;

fn sample_summary() -> Summary {
    let mut status_counts = BTreeMap::new();
    status_counts.insert(200, 180);
    status_counts.insert(503, 10);
    let mut failure_counts = BTreeMap::new();
    failure_counts.insert(FailureKind::Timeout, 10);
    Summary {
        total_requests: 200,
        completed: 190,
        errors: 10,
        timeouts: 10,
        status_counts,
        failure_counts,
        latency: LatencyStats {
            min_ms: 2,
            avg_ms: 12,
            max_ms: 90,
            p50_ms: 10,
            p90_ms: 25,
            p99_ms: 80,
        },
        elapsed: Duration::from_secs(2),
        throughput: 100.0,
    }
}

#[test]
fn text_summary_starts_with_completed_banner() -> AppResult<()> {
    let lines = summary_lines(&sample_summary());
    let first = lines.first().map(String::as_str);
    if first != Some("Completed 200 requests in 2.00s (100.0 RPS)") {
        return Err(AppError::validation(ValidationError::TestExpectationValue {
            message: "unexpected banner",
            value: format!("{:?}", first),
        }));
    }
    let expected = [
        "Errors: 10",
        "Timeouts: 10",
        "Status Codes: 200=180, 503=10",
        "Failures: timeout=10",
        "P50/P90/P99 Latency: 10ms / 25ms / 80ms",
    ];
    for line in expected {
        if !lines.iter().any(|candidate| candidate == line) {
            return Err(AppError::validation(ValidationError::TestExpectationValue {
                message: "missing summary line",
                value: line.to_owned(),
            }));
        }
    }
    Ok(())
}

#[test]
fn json_summary_carries_counts_and_latency() -> AppResult<()> {
    let rendered = render(&sample_summary(), OutputFormat::Json)?;
    let value: serde_json::Value = serde_json::from_str(&rendered)?;
    let checks = [
        (value["total_requests"] == 200, "Unexpected total_requests"),
        (value["errors"] == 10, "Unexpected errors"),
        (value["elapsed_ms"] == 2000, "Unexpected elapsed_ms"),
        (value["status_counts"]["503"] == 10, "Unexpected 503 count"),
        (
            value["failure_counts"]["timeout"] == 10,
            "Unexpected timeout count",
        ),
        (value["latency_ms"]["p99"] == 80, "Unexpected p99"),
        (value["generated_at"].is_string(), "Missing generated_at"),
    ];
    for (ok, msg) in checks {
        if !ok {
            return Err(AppError::validation(msg));
        }
    }
    Ok(())
}

#[test]
fn emit_writes_to_output_file() -> AppResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("summary.txt");
    let path_text = path.to_string_lossy().into_owned();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(emit(
        &sample_summary(),
        OutputFormat::Text,
        Some(path_text.as_str()),
    ))?;
    let written = std::fs::read_to_string(&path)?;
    if written.starts_with("Completed 200 requests") && written.ends_with('\n') {
        Ok(())
    } else {
        Err(AppError::validation(ValidationError::TestExpectationValue {
            message: "unexpected file content",
            value: written,
        }))
    }
}
