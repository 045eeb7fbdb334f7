use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use crawlcheck_core::{
    CrawlConfig, CrawlError, CrawlOptions, CrawlReport, Crawler, Node, ReportFormat,
};
use crawlcheck_scanner::ClientAdapter;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use url::Url;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURES: i32 = 1;
pub const EXIT_CONFIGURATION: i32 = 2;

/// Arguments of the `crawl` subcommand
#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub url: Url,
    pub config: String,
    pub max_requests: Option<usize>,
    pub fail_fast: bool,
    pub no_summary: bool,
    pub format: ReportFormat,
}

impl CrawlArgs {
    pub fn from_matches(args: &ArgMatches) -> Result<Self> {
        let url = args
            .get_one::<Url>("url")
            .ok_or_else(|| anyhow!("--url is required"))?;
        let config = args
            .get_one::<String>("config")
            .ok_or_else(|| anyhow!("--config is required"))?;
        let format = args
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");

        Ok(Self {
            url: url.clone(),
            config: config.clone(),
            max_requests: args.get_one::<usize>("max-requests").copied(),
            fail_fast: args.get_flag("fail-fast"),
            no_summary: args.get_flag("no-summary"),
            format: ReportFormat::from_str(format)
                .ok_or_else(|| anyhow!("Unknown report format: {}", format))?,
        })
    }

    /// Command line flags win over the configuration file.
    pub fn apply_to(&self, options: &mut CrawlOptions) {
        if self.max_requests.is_some() {
            options.max_requests = self.max_requests;
        }
        if self.fail_fast {
            options.capture_exceptions = false;
        }
        if self.no_summary {
            options.output_summary = false;
        }
    }
}

pub fn verbosity_level(count: u8) -> Level {
    match count {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_max_level(verbosity_level(verbosity))
        .with_writer(std::io::stderr)
        .init();
}

/// Expands a leading `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub fn load_config(path: &str) -> Result<CrawlConfig> {
    let path = expand_path(path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    CrawlConfig::from_json(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

pub fn exit_code(err: &CrawlError) -> i32 {
    if err.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURES
    }
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

fn progress_spinner() -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Starting crawl...");
    Ok(spinner)
}

fn print_report(report: &CrawlReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("{}", report.render()),
        ReportFormat::Json => println!(
            "{}",
            report.to_json().context("Failed to serialize report")?
        ),
    }
    Ok(())
}

pub async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let config = load_config(&args.config)?;
    let mut options = config
        .into_options()
        .context("Invalid crawl configuration")?;
    args.apply_to(&mut options);

    // The report is printed here, in the requested format
    let print_summary = options.output_summary;
    options.output_summary = false;

    let adapter = ClientAdapter::detect(args.url.as_str())
        .with_context(|| format!("Cannot crawl {}", args.url))?;

    print_divider();
    eprintln!(
        "{} {}",
        "Crawling".bright_white().bold(),
        args.url.as_str().bright_white()
    );
    eprintln!(
        "Seeds: {}  Rules: {}  Budget: {}",
        options.initial_paths.len(),
        options.rules.len(),
        options
            .max_requests
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    );
    print_divider();

    let spinner = progress_spinner()?;
    let spinner_clone = spinner.clone();
    let mut crawler = Crawler::new(adapter, options)
        .context("Invalid crawl configuration")?
        .with_progress_callback(Arc::new(move |count: usize, node: &Node| {
            spinner_clone.set_message(format!("Crawling... {} processed, last {}", count, node));
        }));

    let outcome = crawler.crawl().await;
    spinner.finish_and_clear();

    let report = crawler.report();
    if print_summary {
        print_report(&report, args.format)?;
    }

    match outcome {
        Ok(_) => {
            eprintln!(
                "{} Crawl complete: visited {} of {} endpoints",
                "✓".green().bold(),
                report.visited,
                report.encountered
            );
            Ok(EXIT_OK)
        }
        Err(e) => {
            eprintln!("{} Crawl failed: {}", "✗".red().bold(), e);
            Ok(exit_code(&e))
        }
    }
}

pub fn handle_check(config: &str) -> Result<i32> {
    let config = load_config(config)?;
    let options = config
        .into_options()
        .context("Invalid crawl configuration")?;

    // Nothing is requested; this only validates selectors and rules
    let crawler =
        Crawler::new(ClientAdapter::Dummy, options).context("Invalid crawl configuration")?;

    let options = crawler.options();
    println!("{} Configuration is valid", "✓".green().bold());
    println!("  Seeds: {}", options.initial_paths.join(", ").bright_white());
    println!("  Rules ({}):", crawler.rules().len());
    for rule in crawler.rules().rules() {
        println!("    {}", rule);
    }
    if !options.ignore_css_selectors.is_empty() {
        println!(
            "  Ignored selectors: {}",
            options.ignore_css_selectors.join(", ")
        );
    }
    if !options.ignore_form_fields.is_empty() {
        println!(
            "  Ignored form fields: {}",
            options.ignore_form_fields.join(", ")
        );
    }

    Ok(EXIT_OK)
}
