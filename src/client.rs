use std::time::Instant;

use chrono::{Datelike, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ProbeError;
use crate::runner::CommandRunner;

/// One row of `statistics/sender`. Extra fields such as `bytes` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderStat {
    pub sender: String,
    pub count: u64,
    pub spamcount: u64,
    pub viruscount: u64,
}

/// One row of `config/domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Day of the month the gateway indexes today's statistics under.
pub fn current_day() -> u32 {
    Local::now().day()
}

/// Queries the gateway through `pmgsh`, optionally wrapped in `sudo`.
pub struct PmgClient<R> {
    runner: R,
    sudo_bin: Option<String>,
    pmgsh_bin: String,
}

impl<R: CommandRunner> PmgClient<R> {
    pub fn new(runner: R, config: &ClientConfig) -> Self {
        Self {
            runner,
            sudo_bin: config.sudo_bin.clone(),
            pmgsh_bin: config.pmgsh_bin.clone(),
        }
    }

    pub fn fetch_sender_stats(&self, day: u32) -> Result<Vec<SenderStat>, ProbeError> {
        let day = day.to_string();
        let stats: Vec<SenderStat> = self.get("statistics/sender", &["--day", &day])?;
        info!(action = "fetch", component = "sender_stats", day = %day, sender_count = stats.len(), "Fetched sender statistics");
        Ok(stats)
    }

    /// Number of individual messages the detail endpoint lists for `address`.
    pub fn fetch_sender_detail_count(&self, address: &str, day: u32) -> Result<u64, ProbeError> {
        let day = day.to_string();
        let records: Vec<serde_json::Value> = self.get(
            "statistics/detail",
            &["--address", address, "--type", "sender", "--day", &day],
        )?;
        Ok(records.len() as u64)
    }

    pub fn fetch_domains(&self) -> Result<Vec<DomainRecord>, ProbeError> {
        let domains: Vec<DomainRecord> = self.get("config/domains", &[])?;
        info!(action = "fetch", component = "relay_domains", domain_count = domains.len(), "Fetched relay domains");
        Ok(domains)
    }

    fn command(&self, path: &str, query: &[&str]) -> Vec<String> {
        let mut command = Vec::with_capacity(query.len() + 4);
        if let Some(sudo) = &self.sudo_bin {
            command.push(sudo.clone());
        }
        command.push(self.pmgsh_bin.clone());
        command.push("get".to_string());
        command.push(path.to_string());
        command.extend(query.iter().map(|arg| arg.to_string()));
        command
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[&str]) -> Result<T, ProbeError> {
        let start_time = Instant::now();
        let output = self.runner.run(&self.command(path, query))?;
        let decoded = decode(path, output.stdout)?;
        info!(
            action = "complete",
            component = "pmg_client",
            path,
            duration_ms = start_time.elapsed().as_millis(),
            "Query decoded"
        );
        Ok(decoded)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: String) -> Result<T, ProbeError> {
    serde_json::from_str(&body).map_err(|source| ProbeError::MalformedResponse {
        query: path.to_string(),
        body,
        source,
    })
}
