use std::process::ExitCode;

use anyhow::Result;
use cfgrender::cli::{self, Args};

fn main() -> Result<ExitCode> {
    let args = Args::parse_args();
    let settings = args.settings()?;
    cli::init_logging(&settings.log_level)?;

    let report = cfgrender::driver::run(&settings);
    Ok(report.exit_code())
}
