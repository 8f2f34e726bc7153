use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wordfreq::standalone::{self, Args, Job, USAGE};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

fn run_wordfreq_job(args: &Args) -> Result<()> {
    let job = Job::from_args(args)?;
    let result = standalone::run_job(&job);
    if let Err(e) = &result {
        match e.downcast_ref::<wordfreq::Error>() {
            Some(err) if err.is_config_error() => error!(job = %job.id, "job not started: {}", err),
            _ => error!(job = %job.id, "job failed: {:#}", e),
        }
    }
    result.map(|_| ())
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging();

    run_wordfreq_job(&args)
}
