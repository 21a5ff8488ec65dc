pub mod constants;
pub mod container;
mod macros;
#[cfg(feature = "test")]
pub mod test_utils;

use std::{io::Write, path::Path};

use chrono::{SecondsFormat, Utc};
use log::trace;
use miette::{miette, IntoDiagnostic, Result};

/// Checks for the existance of a given command.
///
/// # Errors
/// Will error if the command doesn't exist.
pub fn check_command_exists(command: &str) -> Result<()> {
    trace!("check_command_exists({command})");

    which::which(command)
        .map(|path| trace!("Command {command} found at {}", path.display()))
        .map_err(|e| miette!("Command {command} doesn't exist and is required: {e}"))
}

/// Get's the env var wrapping it with
/// miette error messages.
///
/// # Errors
/// Will error if the env var doesn't exist.
pub fn get_env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|e| miette!("Failed to get {key}: {e}"))
}

/// Appends a string to a file, creating
/// the file if it doesn't exist.
///
/// # Errors
/// Will error if it fails to append to a file.
pub fn append_to_file<P: AsRef<Path>>(file_path: P, content: &str) -> Result<()> {
    let file_path = file_path.as_ref();
    trace!("append_to_file({}, {content})", file_path.display());

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)
        .into_diagnostic()?;

    writeln!(file, "{content}").into_diagnostic()
}

/// The current time as an RFC 3339 UTC timestamp,
/// the format expected by `org.opencontainers.image.created`.
#[must_use]
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Splits CI list inputs on commas and newlines,
/// dropping blank entries.
///
/// CI systems usually hand multi-value inputs over
/// as a multi-line string, while humans on a terminal
/// reach for commas.
#[must_use]
pub fn split_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split([',', '\n'])
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Splits CI list inputs on newlines only, for
/// entries that can contain commas themselves like
/// `key=value` pairs or cache specs.
#[must_use]
pub fn split_lines<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .lines()
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use crate::string_vec;

    use super::{split_lines, split_list};

    #[rstest]
    #[case::commas(string_vec!["a,b , c"], string_vec!["a", "b", "c"])]
    #[case::newlines(string_vec!["a\nb\n\nc\n"], string_vec!["a", "b", "c"])]
    #[case::mixed(string_vec!["a,b", "c\nd"], string_vec!["a", "b", "c", "d"])]
    #[case::blank(string_vec!["", " , \n"], Vec::<String>::new())]
    fn split_lists(#[case] input: Vec<String>, #[case] expected: Vec<String>) {
        assert_eq!(split_list(input), expected);
    }

    #[test]
    fn split_lines_keeps_commas() {
        assert_eq!(
            split_lines(["type=registry,ref=ghcr.io/o/app:cache\n\n  a=b,c  "]),
            string_vec!["type=registry,ref=ghcr.io/o/app:cache", "a=b,c"]
        );
    }

    #[test]
    fn timestamp_is_utc() {
        let timestamp = super::current_timestamp();

        assert!(timestamp.ends_with('Z'), "{timestamp}");
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
    }
}
