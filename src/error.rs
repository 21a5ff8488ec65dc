use colored::Colorize;
use miette::Diagnostic;
use thiserror::Error;

/// The configuration given can't produce a build.
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigurationError {
    #[error("No tag mode was configured")]
    #[diagnostic(
        code(buildpush::config::no_mode),
        help(
            "Supply one of `--tags`, `--repositories` with `--base-tag`, or `--json-targets`"
        )
    )]
    NoMode,

    #[error("Only one tag mode can be used at a time, found {}", .modes.join(", ").bold())]
    #[diagnostic(code(buildpush::config::multiple_modes))]
    MultipleModes { modes: Vec<&'static str> },

    #[error("The {} mode requires {}", .mode.bold(), .field.bold())]
    #[diagnostic(code(buildpush::config::missing_field))]
    MissingField {
        mode: &'static str,
        field: &'static str,
    },

    #[error("Push and load can't both be enabled")]
    #[diagnostic(
        code(buildpush::config::push_and_load),
        help("Push the image to a registry or load it into the local image store, not both")
    )]
    PushAndLoad,

    #[error("No targets were resolved")]
    #[diagnostic(code(buildpush::config::no_targets))]
    NoTargets,

    #[error("Invalid base tag {0:?}")]
    #[diagnostic(
        code(buildpush::config::invalid_base_tag),
        help("A tag must match `[A-Za-z0-9_][A-Za-z0-9_.-]{{0,127}}`")
    )]
    InvalidBaseTag(String),

    #[error("{} requires {what}, but none was found in the CI environment", .flag.bold())]
    #[diagnostic(code(buildpush::config::missing_context))]
    MissingContext {
        flag: &'static str,
        what: &'static str,
    },

    #[error("Invalid label {0:?}")]
    #[diagnostic(
        code(buildpush::config::invalid_label),
        help("Labels are written as `key=value` with a non-empty key")
    )]
    InvalidLabel(String),
}

/// A structured input couldn't be used.
#[derive(Error, Diagnostic, Debug)]
pub enum MalformedInputError {
    #[error("JSON targets must be an array of objects: {0}")]
    #[diagnostic(
        code(buildpush::input::invalid_json),
        help("Expected a value like `[{{\"image\": \"ghcr.io/owner/app\", \"tag\": \"latest\"}}]`")
    )]
    InvalidJson(#[source] serde_json::Error),

    #[error(
        "{} has {} malformed entr{} at ind{} {}",
        .input.bold(),
        .indices.len().to_string().red(),
        if .indices.len() == 1 { "y" } else { "ies" },
        if .indices.len() == 1 { "ex" } else { "ices" },
        .indices.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
    )]
    #[diagnostic(code(buildpush::input::invalid_entries))]
    InvalidEntries {
        input: &'static str,
        indices: Vec<usize>,

        #[help]
        details: String,
    },
}

/// Any failure while resolving targets.
#[derive(Error, Diagnostic, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedInput(#[from] MalformedInputError),
}
