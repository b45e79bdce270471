use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::cache::{RefreshOutcome, ResultCache};
use crate::client::PmgClient;
use crate::config::ProbeConfig;
use crate::domains;
use crate::error::ProbeError;
use crate::evaluate::evaluate;
use crate::report::RunResult;
use crate::runner::CommandRunner;

/// Runs the sender and relay domain checks for statistics of `day`.
///
/// The first failing query aborts the run; later checks are skipped and the
/// result ends in [`crate::report::Severity::Unknown`].
pub fn run_checks<R: CommandRunner>(
    client: &PmgClient<R>,
    cache: &ResultCache,
    config: &ProbeConfig,
    day: u32,
) -> RunResult {
    let start_time = Instant::now();
    info!(action = "start", component = "probe", day, "Starting gateway checks");

    let mut result = RunResult::default();
    let checks = check_senders(client, cache, config, day)
        .map(|outcome| result.merge(outcome))
        .and_then(|()| check_domains(client, &config.thresholds.expected_domains))
        .map(|outcome| result.merge(outcome));

    if let Err(e) = checks {
        error!(action = "abort", component = "probe", error = %e, environment = e.is_environment(), "Check aborted");
        result.abort(&e);
    }

    info!(
        action = "complete",
        component = "probe",
        severity = %result.severity(),
        duration_ms = start_time.elapsed().as_millis(),
        "Gateway checks finished"
    );
    result
}

fn check_senders<R: CommandRunner>(
    client: &PmgClient<R>,
    cache: &ResultCache,
    config: &ProbeConfig,
    day: u32,
) -> Result<RunResult, ProbeError> {
    let stats = client.fetch_sender_stats(day)?;

    if config.cache.enabled {
        match cache.refresh(&stats, |sender| client.fetch_sender_detail_count(sender, day)) {
            Ok(RefreshOutcome::Written(entries)) => {
                info!(action = "refresh", component = "result_cache", entries, "Cache refreshed")
            }
            Ok(RefreshOutcome::Skipped) => {}
            Err(e) if e.is_cache() => {
                warn!(action = "refresh", component = "result_cache", error = %e, "Could not write cache snapshot")
            }
            Err(e) => return Err(e),
        }
    }

    let snapshot = cache.load_snapshot();
    Ok(evaluate(&stats, snapshot.as_deref(), &config.thresholds).into_run_result())
}

fn check_domains<R: CommandRunner>(
    client: &PmgClient<R>,
    expected: &BTreeSet<String>,
) -> Result<RunResult, ProbeError> {
    Ok(domains::verify(client, expected)?.into_run_result())
}
