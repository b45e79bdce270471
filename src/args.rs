use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_CACHE_PATH, DEFAULT_PMGSH_BIN, DEFAULT_SUDO_BIN};

#[derive(Parser, Debug)]
#[command(
    name = "check-pmg",
    about = "Check Proxmox Mail Gateway sender statistics and relay domains",
    version,
    long_about = None
)]
pub struct Args {
    /// Threshold for max. mails sent by one sender in a day
    #[arg(short = 'c', long, default_value_t = 500)]
    pub maxcount: u64,

    /// Threshold for max. virus mails sent by one sender in a day
    #[arg(short = 'v', long, default_value_t = 5)]
    pub viruscount: u64,

    /// Threshold for max. spam mails sent by one sender in a day
    #[arg(short = 's', long, default_value_t = 10)]
    pub spamcount: u64,

    /// Domain which must be configured as relay host (repeatable)
    #[arg(short = 'd', long = "domain")]
    pub domains: Vec<String>,

    /// Path of the accurate sender count cache
    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub cache_file: PathBuf,

    /// Refresh the sender count cache from the detail statistics
    #[arg(long)]
    pub cache: bool,

    /// Path to the pmgsh binary
    #[arg(long, default_value = DEFAULT_PMGSH_BIN)]
    pub pmgsh: String,

    /// Path to the sudo binary
    #[arg(long, default_value = DEFAULT_SUDO_BIN)]
    pub sudo: String,

    /// Run pmgsh directly instead of through sudo
    #[arg(long)]
    pub no_sudo: bool,

    /// Kill pmgsh calls running longer than this many seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}
