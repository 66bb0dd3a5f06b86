//! Summary rendering for stdout or an output file.
#[cfg(test)]
mod tests;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::metrics::Summary;

/// Text summary; the first line matches the classic `Completed ...` banner.
#[must_use]
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Completed {} requests in {:.2}s ({:.1} RPS)",
            summary.total_requests,
            summary.elapsed.as_secs_f64(),
            summary.throughput
        ),
        format!("Total Requests: {}", summary.total_requests),
        format!("Completed: {}", summary.completed),
        format!("Errors: {}", summary.errors),
        format!("Timeouts: {}", summary.timeouts),
    ];

    if !summary.status_counts.is_empty() {
        let statuses: Vec<String> = summary
            .status_counts
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect();
        lines.push(format!("Status Codes: {}", statuses.join(", ")));
    }
    if !summary.failure_counts.is_empty() {
        let failures: Vec<String> = summary
            .failure_counts
            .iter()
            .map(|(kind, count)| format!("{}={}", kind.as_str(), count))
            .collect();
        lines.push(format!("Failures: {}", failures.join(", ")));
    }

    let latency = &summary.latency;
    lines.push(format!("Avg Latency: {}ms", latency.avg_ms));
    lines.push(format!(
        "Min/Max Latency: {}ms / {}ms",
        latency.min_ms, latency.max_ms
    ));
    lines.push(format!(
        "P50/P90/P99 Latency: {}ms / {}ms / {}ms",
        latency.p50_ms, latency.p90_ms, latency.p99_ms
    ));
    lines
}

#[must_use]
pub fn summary_json(summary: &Summary) -> serde_json::Value {
    let status_counts: serde_json::Map<String, serde_json::Value> = summary
        .status_counts
        .iter()
        .map(|(status, count)| (status.to_string(), serde_json::json!(count)))
        .collect();
    let failure_counts: serde_json::Map<String, serde_json::Value> = summary
        .failure_counts
        .iter()
        .map(|(kind, count)| (kind.as_str().to_owned(), serde_json::json!(count)))
        .collect();

    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "elapsed_ms": u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
        "total_requests": summary.total_requests,
        "completed": summary.completed,
        "errors": summary.errors,
        "timeouts": summary.timeouts,
        "throughput_rps": summary.throughput,
        "status_counts": status_counts,
        "failure_counts": failure_counts,
        "latency_ms": {
            "min": summary.latency.min_ms,
            "avg": summary.latency.avg_ms,
            "max": summary.latency.max_ms,
            "p50": summary.latency.p50_ms,
            "p90": summary.latency.p90_ms,
            "p99": summary.latency.p99_ms
        }
    })
}

/// Renders the summary in `format`, newline-terminated.
///
/// # Errors
///
/// Returns an error if JSON serialisation fails.
pub fn render(summary: &Summary, format: OutputFormat) -> AppResult<String> {
    let mut rendered = match format {
        OutputFormat::Text => summary_lines(summary).join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(&summary_json(summary))?,
    };
    rendered.push('\n');
    Ok(rendered)
}

/// Prints the summary to stdout, or writes it to `output` when set.
///
/// # Errors
///
/// Returns an error if rendering fails or the output file cannot be written.
pub async fn emit(summary: &Summary, format: OutputFormat, output: Option<&str>) -> AppResult<()> {
    let rendered = render(summary, format)?;
    match output {
        Some(path) => {
            let file = tokio::fs::File::create(path).await?;
            let mut writer = BufWriter::new(file);
            writer.write_all(rendered.as_bytes()).await?;
            writer.flush().await?;
            tracing::info!("Summary written to {}", path);
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
