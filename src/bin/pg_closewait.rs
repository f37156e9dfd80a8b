use clap::Parser;
use pg_scout::utils::logger;
use pg_scout::{CloseWaitArgs, CloseWaitScanner, Result, ScoutError, SystemProcessSource};

fn run(args: &CloseWaitArgs) -> Result<()> {
    let config = args.load_config()?;
    let settings = &config.closewait;
    tracing::info!(
        "Looking for CLOSE_WAIT sockets of processes owned by {}",
        settings.username
    );

    let scanner = CloseWaitScanner::new(SystemProcessSource::new(), settings);
    let summary = scanner.run(&mut std::io::stdout().lock())?;

    tracing::info!(
        "{} process(es), {} CLOSE_WAIT socket(s), {} statement(s) printed",
        summary.processes,
        summary.close_wait,
        summary.statements
    );
    Ok(())
}

fn main() {
    let args = CloseWaitArgs::parse();
    logger::init_cli_logger(args.verbose, args.log_json);

    if let Err(e) = run(&args) {
        report_failure(&e);
    }
}

fn report_failure(e: &ScoutError) -> ! {
    tracing::error!(
        "❌ CLOSE_WAIT scan failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
