
use std::fs;

use tempfile::tempdir;

use support_single::{run_edgeload, spawn_http_server_or_skip};

fn describe(output: &std::process::Output) -> String {
    format!(
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn e2e_single_cli_basic() -> Result<(), String> {
    let Some((url, server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };

    let output = run_edgeload(["-u", url.as_str(), "-n", "20", "-c", "2"])?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.starts_with("Completed 20 requests in ") {
        return Err(format!("Unexpected banner: {}", stdout));
    }
    if !stdout.contains("Errors: 0") {
        return Err(format!("Expected no errors: {}", stdout));
    }
    if server.stats().requests() != 20 {
        return Err(format!(
            "Server saw {} requests, expected 20",
            server.stats().requests()
        ));
    }
    if server.stats().connections() > 8 {
        return Err(format!(
            "Expected keep-alive reuse, saw {} connections",
            server.stats().connections()
        ));
    }
    Ok(())
}

#[test]
fn e2e_single_json_output_file() -> Result<(), String> {
    let Some((url, _server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let summary_path = dir.path().join("summary.json");
    let summary_arg = summary_path.to_string_lossy().into_owned();

    let output = run_edgeload([
        "-u",
        url.as_str(),
        "-n",
        "12",
        "-c",
        "3",
        "--payload",
        "static",
        "--output-format",
        "json",
        "-o",
        summary_arg.as_str(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let text =
        fs::read_to_string(&summary_path).map_err(|err| format!("read summary failed: {}", err))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| format!("parse summary failed: {}", err))?;
    if value.get("total_requests").and_then(serde_json::Value::as_u64) != Some(12) {
        return Err(format!("Unexpected total_requests: {}", text));
    }
    if value.get("completed").and_then(serde_json::Value::as_u64) != Some(12) {
        return Err(format!("Unexpected completed: {}", text));
    }
    Ok(())
}

#[test]
fn e2e_single_config_file_supplies_target() -> Result<(), String> {
    let Some((url, server)) = spawn_http_server_or_skip()? else {
        return Ok(());
    };
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config_path = dir.path().join("edgeload.toml");
    let config = format!(
        "target = \"local\"\nrequests = 5\nconcurrency = 1\n\n[targets]\nlocal = \"{}\"\n",
        url
    );
    fs::write(&config_path, config).map_err(|err| format!("write config failed: {}", err))?;
    let config_arg = config_path.to_string_lossy().into_owned();

    let output = run_edgeload(["--config", config_arg.as_str()])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if server.stats().requests() != 5 {
        return Err(format!(
            "Server saw {} requests, expected 5",
            server.stats().requests()
        ));
    }
    Ok(())
}

#[test]
fn e2e_single_zero_concurrency_fails() -> Result<(), String> {
    let output = run_edgeload(["-u", "http://127.0.0.1:9/ingest", "-c", "0"])?;
    if output.status.success() {
        return Err(format!("Expected failure: {}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_single_unreachable_target_reports_errors() -> Result<(), String> {
    let output = run_edgeload([
        "-u",
        "http://127.0.0.1:9/ingest",
        "-n",
        "4",
        "-c",
        "2",
        "--connect-timeout",
        "500ms",
        "--timeout",
        "1s",
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Errors: 4") {
        return Err(format!("Expected every request to fail: {}", stdout));
    }
    Ok(())
}
