use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("webanalyse")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("webanalyse")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress the progress spinner and non-essential output").required(false))
        .arg(arg!(-v --"verbose" "Log debug output, including every probe").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("analyse")
                .about(
                    "Fetch a single page and report its title, markup version, headings, login \
                form and link accessibility.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page to analyse. http:// is assumed when no scheme is given"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of workers probing external links (default: CPU count)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for each external link probe")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"fetch-timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for fetching the page itself")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, html")
                        .value_parser(["text", "json", "html"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("serve")
                .about("Serve the analysis form over HTTP until interrupted")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .default_value("127.0.0.1:8080"),
                )
                .arg(
                    arg!(--"request-timeout" <SECONDS>)
                        .required(false)
                        .help("Upper bound for a whole analysis request")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Number of workers probing external links per request (default: CPU count)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Timeout for each external link probe")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                ),
        )
}
