use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use stochcheck::cli::{self, Cli, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let start = Instant::now();
    let report = cli::run(&args)?;
    let total = start.elapsed().as_secs_f64();

    match args.format {
        OutputFormat::Text => {
            print!("{}", report.to_report_string());
            println!("Total time required for checking: {} seconds.", total);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!("Total time required for checking: {} seconds.", total);
        }
    }

    if !report.accepted {
        std::process::exit(1);
    }

    Ok(())
}
