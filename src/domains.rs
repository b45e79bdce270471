use std::collections::BTreeSet;

use tracing::info;

use crate::client::{DomainRecord, PmgClient};
use crate::error::ProbeError;
use crate::report::{RunResult, Severity};
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCheck {
    pub expected: usize,
    pub missing: BTreeSet<String>,
}

impl DomainCheck {
    pub fn into_run_result(self) -> RunResult {
        if !self.missing.is_empty() {
            let missing: Vec<&str> = self.missing.iter().map(String::as_str).collect();
            return RunResult::new(
                Severity::Critical,
                format!(
                    "{}: Domains {} not configured as relay hosts!",
                    Severity::Critical,
                    missing.join(", ")
                ),
            );
        }

        match self.expected {
            0 => RunResult::ok("No relay domains to verify."),
            n => RunResult::ok(format!("All {n} expected domains are configured as relay hosts.")),
        }
    }
}

/// Expected domains absent from `found`.
pub fn missing_domains(expected: &BTreeSet<String>, found: &[DomainRecord]) -> DomainCheck {
    let found: BTreeSet<&str> = found.iter().map(|d| d.domain.as_str()).collect();
    DomainCheck {
        expected: expected.len(),
        missing: expected
            .iter()
            .filter(|domain| !found.contains(domain.as_str()))
            .cloned()
            .collect(),
    }
}

/// Checks that every expected domain is configured as a relay domain.
pub fn verify<R: CommandRunner>(
    client: &PmgClient<R>,
    expected: &BTreeSet<String>,
) -> Result<DomainCheck, ProbeError> {
    let found = client.fetch_domains()?;
    let check = missing_domains(expected, &found);
    info!(
        action = "complete",
        component = "domain_verification",
        expected = check.expected,
        missing = check.missing.len(),
        "Verified relay domains"
    );
    Ok(check)
}
