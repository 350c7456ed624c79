//! crates/cli/src/command.rs
//! Command-line definition and argument parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, builder::PathBufValueParser};
use verbosity::{DEFAULT_DELIMITER, Labels, OpenMode};

/// Program name used in help and diagnostics.
pub const PROGRAM_NAME: &str = "verbosity-selftest";

/// Parsed invocation.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) levels: Option<String>,
    pub(crate) delimiter: Option<char>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) truncate: bool,
    pub(crate) labels: Option<Labels>,
    pub(crate) trace_levels: Option<String>,
}

impl ParsedArgs {
    pub(crate) fn delimiter(&self) -> char {
        self.delimiter.unwrap_or(DEFAULT_DELIMITER)
    }

    pub(crate) const fn open_mode(&self) -> OpenMode {
        if self.truncate {
            OpenMode::Truncate
        } else {
            OpenMode::Append
        }
    }
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(delimiter), None) => Ok(delimiter),
        _ => Err(format!("delimiter must be a single character, got '{value}'")),
    }
}

fn parse_labels(value: &str) -> Result<Labels, verbosity::LabelParseError> {
    value.parse()
}

/// Builds the `clap` command used for parsing.
pub(crate) fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Exercise the level and tag gated verbosity controller.")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delimiter")
                .long("delimiter")
                .short('d')
                .value_name("CHAR")
                .help("Split LEVELS on CHAR instead of ','.")
                .value_parser(parse_delimiter),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .short('l')
                .value_name("FILE")
                .help("Write verbose lines to FILE instead of standard error.")
                .value_parser(PathBufValueParser::new()),
        )
        .arg(
            Arg::new("truncate")
                .long("truncate")
                .help("Truncate FILE instead of appending to it.")
                .requires("log-file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .value_name("LIST")
                .help("Comma-separated line labels: timestamp (dt), caller (func), or empty.")
                .value_parser(parse_labels),
        )
        .arg(
            Arg::new("trace-levels")
                .long("trace-levels")
                .value_name("LEVELS")
                .help("Verbosity applied to this program's own tracing events."),
        )
        .arg(
            Arg::new("levels")
                .value_name("LEVELS")
                .help("Active verbosity, e.g. 2 or 2,loop,net.")
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("ignored")
                .num_args(1..)
                .action(ArgAction::Append)
                .hide(true),
        )
}

/// Parses `arguments`, whose first element is the program name.
pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let mut matches = clap_command().try_get_matches_from(arguments)?;

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        levels: matches.remove_one::<String>("levels"),
        delimiter: matches.remove_one::<char>("delimiter"),
        log_file: matches.remove_one::<PathBuf>("log-file"),
        truncate: matches.get_flag("truncate"),
        labels: matches.remove_one::<Labels>("labels"),
        trace_levels: matches.remove_one::<String>("trace-levels"),
    })
}

/// Renders the help text.
pub(crate) fn render_help() -> String {
    clap_command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_uses_defaults() {
        let parsed = parse_args([PROGRAM_NAME]).expect("parse");
        assert!(parsed.levels.is_none());
        assert_eq!(parsed.delimiter(), ',');
        assert_eq!(parsed.open_mode(), OpenMode::Append);
        assert!(parsed.labels.is_none());
        assert!(parsed.trace_levels.is_none());
    }

    #[test]
    fn test_levels_and_options() {
        let parsed = parse_args([
            PROGRAM_NAME,
            "--delimiter",
            ":",
            "--log-file",
            "run.log",
            "--truncate",
            "--labels",
            "func",
            "2:loop",
        ])
        .expect("parse");

        assert_eq!(parsed.levels.as_deref(), Some("2:loop"));
        assert_eq!(parsed.delimiter(), ':');
        assert_eq!(parsed.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(parsed.open_mode(), OpenMode::Truncate);
        assert_eq!(parsed.labels, Some(Labels::CALLER));
    }

    #[test]
    fn test_empty_labels_disable_prefix() {
        let parsed = parse_args([PROGRAM_NAME, "--labels", ""]).expect("parse");
        assert_eq!(parsed.labels, Some(Labels::NONE));
    }

    #[test]
    fn test_rejects_multi_character_delimiter() {
        assert!(parse_args([PROGRAM_NAME, "-d", "::"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_label() {
        assert!(parse_args([PROGRAM_NAME, "--labels", "level"]).is_err());
    }

    #[test]
    fn test_truncate_requires_log_file() {
        assert!(parse_args([PROGRAM_NAME, "--truncate"]).is_err());
    }

    #[test]
    fn test_hyphenated_levels_are_values() {
        let parsed = parse_args([PROGRAM_NAME, "-1"]).expect("parse");
        assert_eq!(parsed.levels.as_deref(), Some("-1"));

        let parsed = parse_args([PROGRAM_NAME, "--labels", "", "-net,2"]).expect("parse");
        assert_eq!(parsed.levels.as_deref(), Some("-net,2"));
        assert_eq!(parsed.labels, Some(Labels::NONE));
    }

    #[test]
    fn test_known_short_flags_still_parse() {
        let parsed = parse_args([PROGRAM_NAME, "-d", ":", "1:x"]).expect("parse");
        assert_eq!(parsed.delimiter(), ':');
        assert_eq!(parsed.levels.as_deref(), Some("1:x"));
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let parsed = parse_args([PROGRAM_NAME, "2", "extra", "more"]).expect("parse");
        assert_eq!(parsed.levels.as_deref(), Some("2"));
    }

    #[test]
    fn test_help_lists_options() {
        let help = render_help();
        assert!(help.contains("--log-file"));
        assert!(help.contains("LEVELS"));
    }
}
