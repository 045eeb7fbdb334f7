use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("crawlcheck")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("crawlcheck")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-v --"verbose" ... "Increase logging verbosity (-v info, -vv debug, -vvv trace)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a running application following the configured rules. Exits non-zero \
                when any request fails.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Base URL of the application under test")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(true)
                        .help("Path to a JSON crawl configuration"),
                )
                .arg(
                    arg!(--"max-requests" <NUM>)
                        .required(false)
                        .help("Abort once this many nodes have been processed")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"fail-fast")
                        .required(false)
                        .help("Stop at the first failure instead of collecting them all")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"no-summary")
                        .required(false)
                        .help("Don't print the end-of-run report")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("check")
                .about("Validate a crawl configuration without sending any request")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(true)
                        .help("Path to a JSON crawl configuration"),
                ),
        )
}
