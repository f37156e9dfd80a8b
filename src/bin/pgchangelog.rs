use clap::Parser;
use pg_scout::core::emit::{NoteEmitter, OutputFormat};
use pg_scout::core::release_notes::build_search_regex;
use pg_scout::core::versions::YearOffsetResolver;
use pg_scout::utils::logger;
use pg_scout::{ChangelogArgs, ChangelogScanner, HttpFetcher, Result, ScoutError};

async fn run(args: &ChangelogArgs) -> Result<usize> {
    let config = args.load_config()?;
    let settings = &config.changelog;

    let resolver = YearOffsetResolver::new(settings.year_offset);
    let spec = args.version_spec(&resolver)?;
    let regex = build_search_regex(&args.regex)?;

    tracing::info!(
        "Scanning PostgreSQL {} release notes for /{}/",
        spec.version_string(),
        args.regex
    );

    let format = if args.csv {
        OutputFormat::Csv
    } else {
        OutputFormat::Text
    };
    let highlight = args.bold.then(|| regex.clone());
    let mut emitter = NoteEmitter::new(std::io::stdout().lock(), format, highlight);

    let scanner = ChangelogScanner::new(HttpFetcher::new(settings.timeout_seconds)?, settings);
    scanner.run(&spec, regex, &mut emitter).await
}

fn report_failure(e: &ScoutError) -> ! {
    tracing::error!(
        "❌ Changelog scan failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = ChangelogArgs::parse();
    logger::init_cli_logger(args.verbose, args.log_json);
    tracing::debug!("CLI args: {:?}", args);

    match run(&args).await {
        Ok(emitted) => {
            tracing::debug!("Done, {} note(s) written", emitted);
            std::process::exit(0);
        }
        Err(e) => report_failure(&e),
    }
}
