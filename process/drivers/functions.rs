use std::fmt::Write;

use rand::{distr::Alphanumeric, Rng};

/// Prints outputs to stdout in the form of [`format_outputs`].
pub(super) fn print_outputs(outputs: &[(&str, &str)]) {
    print!("{}", format_outputs(outputs));
}

/// Formats outputs as dotenv lines, one `name=value` per output.
///
/// Values are kept on a single line by escaping `\` as `\\`
/// and line breaks as `\n`, so a list output stays one variable.
pub(super) fn format_outputs(outputs: &[(&str, &str)]) -> String {
    outputs.iter().fold(String::new(), |mut out, (name, value)| {
        let value = value
            .replace('\\', "\\\\")
            .replace("\r\n", "\n")
            .replace('\r', "\\r")
            .replace('\n', "\\n");
        let _ = writeln!(out, "{name}={value}");
        out
    })
}

/// Formats outputs for a GitHub Actions `$GITHUB_OUTPUT` file.
///
/// Every value uses the heredoc form so multi-line
/// values like the tag list survive intact. The delimiter
/// is random so a value can't end the heredoc early.
pub(super) fn format_github_outputs(outputs: &[(&str, &str)]) -> String {
    let delimiter = format!(
        "ghadelimiter_{}",
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(20)
            .map(char::from)
            .collect::<String>()
    );

    outputs.iter().fold(String::new(), |mut out, (name, value)| {
        let _ = writeln!(out, "{name}<<{delimiter}\n{value}\n{delimiter}");
        out
    })
}
