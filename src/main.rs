use check_pmg::utils::{is_usage_error, setup_logging, usage_error_result, validate_args};
use check_pmg::{
    current_day, run_checks, Args, PmgClient, ProbeConfig, ResultCache, Severity, SystemRunner,
};
use clap::Parser;
use tracing::error;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !is_usage_error(&e) => e.exit(),
        Err(e) => {
            let result = usage_error_result(&e);
            println!("{}", result.render());
            std::process::exit(result.exit_code());
        }
    };
    setup_logging(args.verbose);

    if let Err(e) = validate_args(&args) {
        error!(action = "validate", component = "args", error = %e, "Invalid arguments");
        println!("{}: {e:#}", Severity::Unknown);
        std::process::exit(Severity::Unknown.exit_code());
    }

    let config = ProbeConfig::from(&args);
    let client = PmgClient::new(SystemRunner::new(config.client.timeout), &config.client);
    let cache = ResultCache::new(&config.cache.path);

    let result = run_checks(&client, &cache, &config, current_day());
    println!("{}", result.render());
    std::process::exit(result.exit_code());
}
