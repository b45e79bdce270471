use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::Args;

pub const DEFAULT_CACHE_PATH: &str = "/var/cache/check_pmg/sender_counts.json";
pub const DEFAULT_PMGSH_BIN: &str = "/usr/bin/pmgsh";
pub const DEFAULT_SUDO_BIN: &str = "/usr/bin/sudo";

/// Per-day limits. A sender at or above a limit is flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub sender_limit: u64,
    pub spam_limit: u64,
    pub virus_limit: u64,
    pub expected_domains: BTreeSet<String>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            sender_limit: 500,
            spam_limit: 10,
            virus_limit: 5,
            expected_domains: BTreeSet::new(),
        }
    }
}

/// How the administrative client is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub sudo_bin: Option<String>,
    pub pmgsh_bin: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sudo_bin: Some(DEFAULT_SUDO_BIN.to_string()),
            pmgsh_bin: DEFAULT_PMGSH_BIN.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Refresh the snapshot from the detail endpoint during this run.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_PATH),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeConfig {
    pub thresholds: ThresholdConfig,
    pub client: ClientConfig,
    pub cache: CacheConfig,
}

impl From<&Args> for ProbeConfig {
    fn from(args: &Args) -> Self {
        Self {
            thresholds: ThresholdConfig {
                sender_limit: args.maxcount,
                spam_limit: args.spamcount,
                virus_limit: args.viruscount,
                expected_domains: args.domains.iter().cloned().collect(),
            },
            client: ClientConfig {
                sudo_bin: (!args.no_sudo).then(|| args.sudo.clone()),
                pmgsh_bin: args.pmgsh.clone(),
                timeout: args.timeout.map(Duration::from_secs),
            },
            cache: CacheConfig {
                path: args.cache_file.clone(),
                enabled: args.cache,
            },
        }
    }
}
