//! Command line interface

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::alerts::notifier::DEFAULT_SMTP_PORT;
use crate::search::client::DEFAULT_PORT;

pub fn build_cli() -> Command {
    Command::new("healthy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Send a mail when services are unavailable")
        .long_about(
            "Polls the daily logstash index every <interval> for 5xx responses (or a custom \
             search) and mails the matched messages when anything turns up.",
        )
        .disable_version_flag(true)
        .arg(
            Arg::new("interval")
                .help("Polling interval, e.g. 30s, 5m, 1h30m")
                .env("HEALTHY_INTERVAL")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("es-host")
                .long("es-host")
                .value_name("host")
                .env("HEALTHY_ES_HOST")
                .default_value("localhost")
                .help("ElasticSearch host"),
        )
        .arg(
            Arg::new("es-port")
                .long("es-port")
                .value_name("port")
                .env("HEALTHY_ES_PORT")
                .value_parser(value_parser!(u16))
                .default_value("9200")
                .help("ElasticSearch HTTP port"),
        )
        .arg(
            Arg::new("es-search")
                .long("es-search")
                .value_name("json")
                .env("HEALTHY_ES_SEARCH")
                .value_parser(value_parser!(PathBuf))
                .help("JSON file used as request body (default to 'response:5*')"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("mail")
                .env("HEALTHY_FROM")
                .help("Mail sender (default to healthy@$HOST)"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("mail")
                .env("HEALTHY_TO")
                .help("Mail recipient (default to $USER@$HOST)"),
        )
        .arg(
            Arg::new("smtp-host")
                .long("smtp-host")
                .value_name("host")
                .env("HEALTHY_SMTP_HOST")
                .default_value("localhost")
                .help("SMTP host"),
        )
        .arg(
            Arg::new("smtp-port")
                .long("smtp-port")
                .value_name("port")
                .env("HEALTHY_SMTP_PORT")
                .value_parser(value_parser!(u16))
                .default_value("25")
                .help("SMTP port"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("duration")
                .env("HEALTHY_TIMEOUT")
                .help("Give up on a search or mail delivery after this long"),
        )
        .arg(
            Arg::new("keep-going")
                .long("keep-going")
                .action(ArgAction::SetTrue)
                .help("Log failed checks and keep polling instead of exiting"),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Output version"),
        )
}

/// Parsed command line arguments, before defaults are derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub interval: String,
    pub es_host: String,
    pub es_port: u16,
    pub es_search: Option<PathBuf>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout: Option<String>,
    pub keep_going: bool,
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned();

        Self {
            interval: string("interval").unwrap_or_default(),
            es_host: string("es-host").unwrap_or_else(|| "localhost".to_string()),
            es_port: matches
                .get_one::<u16>("es-port")
                .copied()
                .unwrap_or(DEFAULT_PORT),
            es_search: matches.get_one::<PathBuf>("es-search").cloned(),
            from: string("from"),
            to: string("to"),
            smtp_host: string("smtp-host").unwrap_or_else(|| "localhost".to_string()),
            smtp_port: matches
                .get_one::<u16>("smtp-port")
                .copied()
                .unwrap_or(DEFAULT_SMTP_PORT),
            timeout: string("timeout"),
            keep_going: matches.get_flag("keep-going"),
        }
    }
}

pub fn get_matches() -> ArgMatches {
    build_cli().get_matches()
}
