use colored::Colorize;
use commands::command_argument_builder;
use crawlcheck::handlers::{
    CrawlArgs, EXIT_CONFIGURATION, handle_check, handle_crawl, init_logging,
};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    init_logging(chosen_command.get_count("verbose"));

    let outcome = match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => match CrawlArgs::from_matches(primary_command) {
            Ok(args) => handle_crawl(&args).await,
            Err(e) => Err(e),
        },
        Some(("check", primary_command)) => {
            let config = primary_command
                .get_one::<String>("config")
                .expect("clap enforces required arguments");
            handle_check(config)
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(EXIT_CONFIGURATION);
        }
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
