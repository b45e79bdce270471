use std::fmt;

use tracing::info;

use crate::cache::CacheEntry;
use crate::client::SenderStat;
use crate::config::ThresholdConfig;
use crate::report::{RunResult, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    SpamCount,
    VirusCount,
    MailCount,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::SpamCount => "Spam count",
            Metric::VirusCount => "Virus count",
            Metric::MailCount => "Mail count",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub sender: String,
    pub metric: Metric,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    pub severity: Severity,
    /// Whether mail counts came from the cache snapshot.
    pub used_cache: bool,
}

impl Evaluation {
    pub fn violations_for(&self, metric: Metric) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.metric == metric)
    }

    pub fn into_run_result(self) -> RunResult {
        if self.violations.is_empty() {
            return RunResult::ok("No sender exceeded the spam, virus or mail count thresholds.");
        }

        let mut message = format!("{}: sender thresholds exceeded", self.severity);
        for v in &self.violations {
            message.push_str(&format!("\n {} {}: {}", v.sender, v.metric, v.value));
        }
        RunResult::new(self.severity, message)
    }
}

/// Flags senders at or above the configured limits.
///
/// Mail counts come from `cache` when it holds entries, since the summary
/// statistics undercount multi-recipient mail.
pub fn evaluate(
    stats: &[SenderStat],
    cache: Option<&[CacheEntry]>,
    config: &ThresholdConfig,
) -> Evaluation {
    let mut violations = Vec::new();

    violations.extend(
        stats
            .iter()
            .filter(|s| s.spamcount >= config.spam_limit)
            .map(|s| violation(&s.sender, Metric::SpamCount, s.spamcount)),
    );
    violations.extend(
        stats
            .iter()
            .filter(|s| s.viruscount >= config.virus_limit)
            .map(|s| violation(&s.sender, Metric::VirusCount, s.viruscount)),
    );

    let snapshot = cache.filter(|entries| !entries.is_empty());
    match snapshot {
        Some(entries) => violations.extend(
            entries
                .iter()
                .filter(|e| e.count >= config.sender_limit)
                .map(|e| violation(&e.sender, Metric::MailCount, e.count)),
        ),
        None => violations.extend(
            stats
                .iter()
                .filter(|s| s.count >= config.sender_limit)
                .map(|s| violation(&s.sender, Metric::MailCount, s.count)),
        ),
    }

    let severity = if violations.is_empty() {
        Severity::Ok
    } else {
        Severity::Warning
    };

    info!(
        action = "complete",
        component = "threshold_evaluation",
        sender_count = stats.len(),
        violation_count = violations.len(),
        used_cache = snapshot.is_some(),
        "Evaluated sender thresholds"
    );

    Evaluation {
        violations,
        severity,
        used_cache: snapshot.is_some(),
    }
}

fn violation(sender: &str, metric: Metric, value: u64) -> Violation {
    Violation {
        sender: sender.to_string(),
        metric,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(sender: &str, count: u64, spamcount: u64, viruscount: u64) -> SenderStat {
        SenderStat {
            sender: sender.to_string(),
            count,
            spamcount,
            viruscount,
        }
    }

    fn entry(sender: &str, count: u64) -> CacheEntry {
        CacheEntry {
            sender: sender.to_string(),
            count,
        }
    }

    #[test]
    fn empty_stats_do_not_escalate() {
        let evaluation = evaluate(&[], None, &ThresholdConfig::default());
        assert!(evaluation.violations.is_empty());
        assert_eq!(evaluation.severity, Severity::Ok);
    }

    #[test]
    fn limits_are_inclusive() {
        let config = ThresholdConfig::default();
        let stats = [
            stat("at@a.com", 500, 10, 5),
            stat("below@a.com", 499, 9, 4),
        ];
        let evaluation = evaluate(&stats, None, &config);

        assert_eq!(
            evaluation.violations,
            vec![
                violation("at@a.com", Metric::SpamCount, 10),
                violation("at@a.com", Metric::VirusCount, 5),
                violation("at@a.com", Metric::MailCount, 500),
            ]
        );
    }

    #[test]
    fn spam_offenders_listed_exactly_once() {
        let config = ThresholdConfig::default();
        let stats = [
            stat("a@a.com", 1, 50, 0),
            stat("b@a.com", 1, 3, 0),
            stat("c@a.com", 1, 11, 0),
        ];
        let evaluation = evaluate(&stats, None, &config);
        let spam: Vec<_> = evaluation
            .violations_for(Metric::SpamCount)
            .map(|v| v.sender.as_str())
            .collect();

        assert_eq!(spam, ["a@a.com", "c@a.com"]);
        assert_eq!(evaluation.severity, Severity::Warning);
    }

    #[test]
    fn mail_count_over_limit_warns() {
        let config = ThresholdConfig::default();
        let stats = [stat("x@a.com", 600, 2, 0)];
        let evaluation = evaluate(&stats, None, &config);

        assert_eq!(
            evaluation.violations,
            vec![violation("x@a.com", Metric::MailCount, 600)]
        );
        assert_eq!(evaluation.severity, Severity::Warning);
        assert!(!evaluation.used_cache);
    }

    #[test]
    fn cache_counts_replace_raw_counts() {
        let config = ThresholdConfig::default();
        let stats = [stat("x@a.com", 600, 0, 0), stat("y@a.com", 120, 0, 0)];
        let cache = [entry("x@a.com", 450), entry("y@a.com", 700)];
        let evaluation = evaluate(&stats, Some(&cache), &config);

        assert!(evaluation.used_cache);
        assert_eq!(
            evaluation.violations,
            vec![violation("y@a.com", Metric::MailCount, 700)]
        );
    }

    #[test]
    fn empty_cache_falls_back_to_raw_counts() {
        let config = ThresholdConfig::default();
        let stats = [stat("x@a.com", 600, 0, 0)];
        let evaluation = evaluate(&stats, Some(&[]), &config);

        assert!(!evaluation.used_cache);
        assert_eq!(evaluation.violations.len(), 1);
    }

    #[test]
    fn run_result_lists_each_violation() {
        let config = ThresholdConfig::default();
        let stats = [stat("x@a.com", 600, 12, 0)];
        let result = evaluate(&stats, None, &config).into_run_result();

        assert_eq!(result.severity(), Severity::Warning);
        assert_eq!(
            result.messages(),
            ["Warning: sender thresholds exceeded\n x@a.com Spam count: 12\n x@a.com Mail count: 600"]
        );
    }

    #[test]
    fn clean_run_result_confirms() {
        let result = evaluate(&[stat("x@a.com", 3, 0, 0)], None, &ThresholdConfig::default())
            .into_run_result();
        assert_eq!(result.severity(), Severity::Ok);
        assert_eq!(result.messages().len(), 1);
    }
}
