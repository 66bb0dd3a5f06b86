use super::aggregator::SeenIndices;
use super::*;
use crate::error::{AppError, AppResult, FailureKind, MetricsError, TransportError};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

fn completed(index: u64, status_code: u16, latency_ms: u64) -> Outcome {
    Outcome::new(
        index,
        0,
        Duration::from_millis(latency_ms),
        OutcomeResult::Completed {
            status_code,
            body: "ok".to_owned(),
        },
    )
}

fn failed(index: u64, err: &TransportError) -> Outcome {
    Outcome::new(index, 1, Duration::from_millis(1), OutcomeResult::failed(err))
}

#[test]
fn throughput_is_total_over_elapsed_seconds() -> AppResult<()> {
    let mut tally = Tally::new()?;
    for index in 0..200 {
        tally.record(&completed(index, 200, 5))?;
    }
    let summary = Summary::from_tally(&tally, Duration::from_secs(2));
    if summary.total_requests != 200 {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected total",
            value: summary.total_requests.to_string(),
        }));
    }
    if (summary.throughput - 100.0).abs() > 1e-9 {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "throughput should be 100.0",
            value: summary.throughput.to_string(),
        }));
    }
    Ok(())
}

#[test]
fn zero_elapsed_reports_zero_throughput() -> AppResult<()> {
    let mut tally = Tally::new()?;
    tally.record(&completed(0, 200, 1))?;
    let summary = Summary::from_tally(&tally, Duration::ZERO);
    if summary.throughput.abs() > f64::EPSILON {
        return Err(AppError::metrics("throughput should be zero"));
    }
    Ok(())
}

#[test]
fn tally_separates_statuses_and_failures() -> AppResult<()> {
    let mut tally = Tally::new()?;
    let timeout = TransportError::Timeout {
        after: Duration::from_millis(1),
    };
    let connect = TransportError::Connect {
        message: "refused".to_owned(),
    };
    tally.record(&completed(0, 200, 3))?;
    tally.record(&completed(1, 200, 3))?;
    tally.record(&completed(2, 503, 3))?;
    tally.record(&failed(3, &timeout))?;
    tally.record(&failed(4, &timeout))?;
    tally.record(&failed(5, &connect))?;

    let summary = Summary::from_tally(&tally, Duration::from_secs(1));
    if summary.completed != 3 || summary.errors != 3 || summary.timeouts != 2 {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected counters",
            value: format!("{:?}", summary),
        }));
    }
    if summary.status_counts.get(&200) != Some(&2) || summary.status_counts.get(&503) != Some(&1)
    {
        return Err(AppError::metrics("unexpected status counts"));
    }
    if summary.failure_counts.get(&FailureKind::Connect) != Some(&1) {
        return Err(AppError::metrics("unexpected failure counts"));
    }
    Ok(())
}

#[test]
fn latency_stats_cover_min_avg_max() -> AppResult<()> {
    let mut tally = Tally::new()?;
    tally.record(&completed(0, 200, 10))?;
    tally.record(&completed(1, 200, 20))?;
    tally.record(&completed(2, 200, 30))?;
    let latency = Summary::from_tally(&tally, Duration::from_secs(1)).latency;
    if latency.min_ms != 10 || latency.avg_ms != 20 || latency.max_ms != 30 {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected latency stats",
            value: format!("{:?}", latency),
        }));
    }
    if latency.p50_ms != 20 {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected p50",
            value: latency.p50_ms.to_string(),
        }));
    }
    Ok(())
}

#[test]
fn collect_accepts_any_completion_order() -> AppResult<()> {
    run_async_test(async {
        let (tx, stream) = outcome_channel(8);
        let started = Instant::now();
        for index in (0..5).rev() {
            if tx.send(completed(index, 200, 1)).await.is_err() {
                return Err(AppError::metrics("stream closed"));
            }
        }
        let summary = Aggregator::new(5).collect(stream, started).await?;
        if summary.total_requests != 5 || summary.completed != 5 {
            return Err(AppError::metrics(MetricsError::TestExpectationValue {
                message: "unexpected summary",
                value: format!("{:?}", summary),
            }));
        }
        drop(tx);
        Ok(())
    })
}

#[test]
fn collect_rejects_duplicate_indices() -> AppResult<()> {
    run_async_test(async {
        let (tx, stream) = outcome_channel(4);
        for index in [0, 1, 1] {
            if tx.send(completed(index, 200, 1)).await.is_err() {
                return Err(AppError::metrics("stream closed"));
            }
        }
        match Aggregator::new(3).collect(stream, Instant::now()).await {
            Err(AppError::Metrics(MetricsError::DuplicateOutcome { index: 1 })) => Ok(()),
            Err(err) => Err(err),
            Ok(_) => Err(AppError::metrics("duplicate index should fail")),
        }
    })
}

#[test]
fn collect_rejects_out_of_range_indices() -> AppResult<()> {
    run_async_test(async {
        let (tx, stream) = outcome_channel(4);
        if tx.send(completed(7, 200, 1)).await.is_err() {
            return Err(AppError::metrics("stream closed"));
        }
        match Aggregator::new(2).collect(stream, Instant::now()).await {
            Err(AppError::Metrics(MetricsError::OutcomeOutOfRange { index: 7, total: 2 })) => {
                Ok(())
            }
            Err(err) => Err(err),
            Ok(_) => Err(AppError::metrics("out of range index should fail")),
        }
    })
}

#[test]
fn collect_fails_when_stream_closes_early() -> AppResult<()> {
    run_async_test(async {
        let (tx, stream) = outcome_channel(4);
        if tx.send(completed(0, 200, 1)).await.is_err() {
            return Err(AppError::metrics("stream closed"));
        }
        drop(tx);
        match Aggregator::new(3).collect(stream, Instant::now()).await {
            Err(AppError::Metrics(MetricsError::OutcomesMissing {
                expected: 3,
                observed: 1,
            })) => Ok(()),
            Err(err) => Err(err),
            Ok(_) => Err(AppError::metrics("missing outcomes should fail")),
        }
    })
}

#[test]
fn outcomes_describe_like_the_console_log() -> AppResult<()> {
    let ok = completed(0, 201, 1).describe();
    if ok != "OK: 201 ok" {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected completed line",
            value: ok,
        }));
    }
    let err = failed(
        1,
        &TransportError::Timeout {
            after: Duration::from_millis(250),
        },
    )
    .describe();
    if err != "Error: Request timed out after 250ms." {
        return Err(AppError::metrics(MetricsError::TestExpectationValue {
            message: "unexpected error line",
            value: err,
        }));
    }
    Ok(())
}

#[test]
fn huge_expected_total_does_not_preallocate() -> AppResult<()> {
    run_async_test(async {
        let (tx, stream) = outcome_channel(4);
        for index in 0..3 {
            if tx.send(completed(index, 200, 1)).await.is_err() {
                return Err(AppError::metrics("stream closed"));
            }
        }
        drop(tx);
        match Aggregator::new(u64::MAX).collect(stream, Instant::now()).await {
            Err(AppError::Metrics(MetricsError::OutcomesMissing {
                expected: u64::MAX,
                observed: 3,
            })) => Ok(()),
            Err(err) => Err(err),
            Ok(_) => Err(AppError::metrics("missing outcomes should fail")),
        }
    })
}

#[test]
fn seen_indices_grow_to_the_highest_index() -> AppResult<()> {
    let mut seen = SeenIndices::new(u64::MAX);
    for index in [5_000, 0, 63, 64] {
        seen.insert(index)?;
    }
    match seen.insert(5_000) {
        Err(MetricsError::DuplicateOutcome { index: 5_000 }) => {}
        Err(err) => return Err(err.into()),
        Ok(()) => return Err(AppError::metrics("repeated index should fail")),
    }
    match seen.insert(u64::MAX) {
        Err(MetricsError::OutcomeOutOfRange { .. }) => Ok(()),
        Err(err) => Err(err.into()),
        Ok(()) => Err(AppError::metrics("index at the total should fail")),
    }
}

#[test]
fn sub_millisecond_latencies_average_at_least_one_ms() -> AppResult<()> {
    let mut tally = Tally::new()?;
    for index in 0..4 {
        tally.record(&Outcome::new(
            index,
            0,
            Duration::from_micros(200),
            OutcomeResult::Completed {
                status_code: 200,
                body: "ok".to_owned(),
            },
        ))?;
    }
    let latency = Summary::from_tally(&tally, Duration::from_secs(1)).latency;
    if latency.avg_ms != 1 || latency.min_ms != 1 || latency.max_ms != 1 {
        return Err(AppError::metrics(format!("unexpected latency stats: {:?}", latency)));
    }
    Ok(())
}
