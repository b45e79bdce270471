pub mod args;
pub mod cache;
pub mod client;
pub mod config;
pub mod domains;
pub mod error;
pub mod evaluate;
pub mod probe;
pub mod report;
pub mod runner;
pub mod utils;

pub use args::Args;
pub use cache::{CacheEntry, ResultCache};
pub use client::{current_day, DomainRecord, PmgClient, SenderStat};
pub use config::ProbeConfig;
pub use error::ProbeError;
pub use probe::run_checks;
pub use report::{RunResult, Severity};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
