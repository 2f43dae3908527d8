//! Phishing Analyzer - command-line front end
//!
//! Collects email subjects and bodies from arguments or files, runs the
//! content analyzer over them, and renders or exports the verdicts.

use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, LevelFilter};

use phishing_analyzer::app::{self, RunOptions};
use phishing_analyzer::config::resolve_corpus;
use phishing_analyzer::utils::file_utils::{self, FileLimits};
use phishing_analyzer::utils::output_formatter;
use phishing_analyzer::{AnalysisInput, AnalysisResult, ContentAnalyzer, Verdict};

/// Exit status when `--fail-on` is triggered
const EXIT_VERDICT: i32 = 2;

/// Verdict threshold for `--fail-on`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FailOn {
    Suspicious,
    Phishing,
}

impl FailOn {
    fn verdict(self) -> Verdict {
        match self {
            FailOn::Suspicious => Verdict::Suspicious,
            FailOn::Phishing => Verdict::Phishing,
        }
    }
}

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "phishing_analyzer",
    version,
    about = "A heuristic email content analyzer for phishing indicators",
    long_about = "Scores email subject and body text for phishing indicators such as:
- Urgent or pressuring language
- Financial and identity bait
- Social-engineering keywords
- Suspicious URLs (IP hosts, shorteners, high-abuse TLDs)
- Requests for passwords or logins"
)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(true)
        .args(["subject", "body", "body_file", "files", "dir"]),
))]
struct Args {
    /// Email subject to analyze
    #[arg(long = "subject")]
    subject: Option<String>,

    /// Email body to analyze
    #[arg(long = "body")]
    body: Option<String>,

    /// Read the email body from a file (use with --subject)
    #[arg(long = "body-file")]
    body_file: Option<PathBuf>,

    /// Email file(s) to analyze; a leading header block supplies the subject
    #[arg(name = "files")]
    files: Vec<PathBuf>,

    /// Analyze all files in directory (recursively)
    #[arg(long = "dir")]
    dir: Option<PathBuf>,

    /// Exclude file pattern (glob syntax, can be used multiple times)
    #[arg(long = "exclude", action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Include only file pattern (glob syntax, can be used multiple times)
    #[arg(long = "include", action = ArgAction::Append)]
    include: Vec<String>,

    /// Maximum file size to analyze in MB
    #[arg(long = "max-size", default_value = "10")]
    max_size: u64,

    /// Maximum number of files to collect from --dir
    #[arg(long = "max-files", default_value = "1000")]
    max_files: usize,

    /// Corpus configuration file (JSON)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Simulated processing delay per email in milliseconds
    #[arg(long = "delay-ms", default_value = "0")]
    delay_ms: u64,

    /// Number of parallel workers (0=auto)
    #[arg(long = "parallel", default_value = "0")]
    parallel: usize,

    /// Exit with status 2 if any email reaches this verdict or worse
    #[arg(long = "fail-on", value_enum)]
    fail_on: Option<FailOn>,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Export results to JSON file
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Export results to HTML report
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Export results to CSV file
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Show only summary information
    #[arg(long = "summary-only", action = ArgAction::SetTrue)]
    summary_only: bool,

    /// Set logging level
    #[arg(long = "log-level", default_value = "warn")]
    log_level: LevelFilter,

    /// Log file path (logs go to stderr when unset)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let args = Args::parse();

    setup_logging(&args);

    let corpus = resolve_corpus(args.config.as_deref()).context("Failed to load corpus configuration")?;
    let analyzer = ContentAnalyzer::new(corpus);
    info!("Corpus has {} detection patterns", analyzer.corpus().pattern_count());

    let inputs = gather_inputs(&args)?;
    if inputs.is_empty() {
        eprintln!("{}", "Error: Nothing to analyze: no email content provided or found".red());
        eprintln!("Run with --help for usage information");
        process::exit(1);
    }

    let all_results = analyze_all(&inputs, &analyzer, &args)?;

    export_all_results(&all_results, &args)?;

    if !args.quiet {
        print_results(&all_results, &args, start_time);
    }

    if let Some(fail_on) = args.fail_on {
        let threshold = fail_on.verdict();
        if all_results.iter().any(|(_, r)| r.verdict() >= threshold) {
            process::exit(EXIT_VERDICT);
        }
    }

    Ok(())
}

/// Set up logging to stderr or a log file
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = &args.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Cannot open log file {}: {}", path.display(), e),
        }
    }

    builder.init();
}

/// Build the list of emails to analyze from inline arguments and files
fn gather_inputs(args: &Args) -> Result<Vec<(String, AnalysisInput)>> {
    let mut inputs = Vec::new();
    let limits = FileLimits::from_megabytes(args.max_size, args.max_files);

    if args.subject.is_some() || args.body.is_some() || args.body_file.is_some() {
        let body = match (&args.body, &args.body_file) {
            (_, Some(path)) => file_utils::read_body_file(path, &limits)?,
            (Some(body), None) => body.clone(),
            (None, None) => String::new(),
        };
        let input = AnalysisInput::new(args.subject.clone().unwrap_or_default(), body);

        if input.is_blank() {
            eprintln!("{}", "Error: Nothing to analyze: subject and body are both empty".red());
            process::exit(1);
        }
        inputs.push(("<command line>".to_string(), input));
    }

    let files = file_utils::collect_files(
        &args.files,
        args.dir.as_deref(),
        &args.include,
        &args.exclude,
        &limits,
    );

    for path in files {
        match file_utils::read_email_file(&path) {
            Ok(email) => inputs.push((email.path.display().to_string(), email.input)),
            Err(e) => error!("{:#}", e),
        }
    }

    Ok(inputs)
}

/// Analyze all emails with progress tracking
fn analyze_all(
    inputs: &[(String, AnalysisInput)],
    analyzer: &ContentAnalyzer,
    args: &Args,
) -> Result<Vec<(String, AnalysisResult)>> {
    let options = RunOptions {
        workers: args.parallel,
        delay: Duration::from_millis(args.delay_ms),
    };

    // Only worth a progress bar for batches or when a delay is simulated
    let progress_bar = if !args.quiet && (inputs.len() > 1 || args.delay_ms > 0) {
        println!(
            "\n{} {} email(s) with {} workers...",
            "Analyzing".bold(),
            inputs.len(),
            app::worker_count(options.workers)
        );
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} emails ({eta})")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let results = app::run_analyzer(inputs, analyzer, &options, || {
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    })?;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis complete");
    }

    Ok(results)
}

/// Export results based on command line arguments
fn export_all_results(all_results: &[(String, AnalysisResult)], args: &Args) -> Result<()> {
    if let Some(path) = &args.json {
        output_formatter::export_results_json(all_results, path)?;
        info!("Wrote JSON report to {}", path.display());
    }

    if let Some(path) = &args.html {
        output_formatter::create_html_report(all_results, path)?;
        info!("Wrote HTML report to {}", path.display());
    }

    if let Some(path) = &args.csv {
        output_formatter::create_csv_report(all_results, path)?;
        info!("Wrote CSV report to {}", path.display());
    }

    Ok(())
}

fn print_results(all_results: &[(String, AnalysisResult)], args: &Args, start_time: Instant) {
    if !args.summary_only {
        for (source, result) in all_results {
            println!("\n{}", "=".repeat(80).bold());
            println!("{} {}", "Results for:".cyan(), source);
            println!("{}", "=".repeat(80).bold());
            println!("{}", output_formatter::format_result(result, args.md));
        }
    }

    if all_results.len() > 1 || args.summary_only {
        println!("\n{}", output_formatter::create_summary(all_results));
    }

    println!(
        "{} {:.2} seconds",
        "Time elapsed:".green(),
        start_time.elapsed().as_secs_f64()
    );
}
