use std::{
    borrow::Cow,
    io::{BufRead, BufReader, Result},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::LazyLock,
    thread,
    time::Duration,
};

use chrono::Local;
use colored::{control::ShouldColorize, ColoredString, Colorize};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use log::{Level, LevelFilter, Record};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Root},
    encode::{pattern::PatternEncoder, Encode, Write},
    Config, Logger as L4RSLogger,
};
use nu_ansi_term::Color;
use private::Private;
use rand::Rng;

mod private {
    pub trait Private {}
}

impl Private for Command {}

static MULTI_PROGRESS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
    log_dir: Option<PathBuf>,
}

impl Logger {
    const LOG_FILENAME: &'static str = "buildpush.log";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn filter_level(&mut self, filter_level: LevelFilter) -> &mut Self {
        self.level = filter_level;
        self
    }

    /// Also write logs to `buildpush.log` in this directory.
    pub fn log_out_dir<P>(&mut self, path: Option<P>) -> &mut Self
    where
        P: AsRef<Path>,
    {
        self.log_dir = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Initializes logging for the application.
    ///
    /// # Panics
    /// Will panic if logging is unable to be initialized.
    pub fn init(&self) {
        let stderr = ConsoleAppender::builder()
            .encoder(Box::new(CustomPatternEncoder))
            .target(Target::Stderr)
            .build();

        let config =
            Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
        let mut root = Root::builder().appender("stderr");

        let config = match self.log_dir.as_ref().map(|log_dir| {
            FileAppender::builder()
                .encoder(Box::new(PatternEncoder::new("{d} - {l} - {m}{n}")))
                .build(log_dir.join(Self::LOG_FILENAME))
        }) {
            None => config,
            Some(Err(e)) => {
                eprintln!("Cannot create log file:\n{e}");
                config
            }
            Some(Ok(file_appender)) => {
                root = root.appender("file");
                config.appender(Appender::builder().build("file", Box::new(file_appender)))
            }
        }
        .build(root.build(self.level))
        .expect("Logger config should build");

        let logger = L4RSLogger::new(config);

        LogWrapper::new(MULTI_PROGRESS.clone(), logger)
            .try_init()
            .expect("LogWrapper should initialize");
        log::set_max_level(self.level);
    }

    pub fn multi_progress() -> MultiProgress {
        MULTI_PROGRESS.clone()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            log_dir: None,
        }
    }
}

trait ColoredLevel {
    fn colored(&self) -> ColoredString;
}

impl ColoredLevel for Level {
    fn colored(&self) -> ColoredString {
        match self {
            Self::Error => Self::Error.as_str().red(),
            Self::Warn => Self::Warn.as_str().yellow(),
            Self::Info => Self::Info.as_str().green(),
            Self::Debug => Self::Debug.as_str().blue(),
            Self::Trace => Self::Trace.as_str().cyan(),
        }
    }
}

pub trait CommandLogging: Private {
    /// Prints each line of stdout/stderr with an image ref string
    /// and a progress spinner.
    ///
    /// # Errors
    /// Will error if there was an issue executing the process.
    fn build_status<T, U>(self, image_ref: T, message: U) -> Result<ExitStatus>
    where
        T: AsRef<str>,
        U: AsRef<str>;

    /// Prints each line of stdout/stderr with a log header
    /// and a progress spinner.
    ///
    /// # Errors
    /// Will error if there was an issue executing the process.
    fn message_status<S, D>(self, header: S, message: D) -> Result<ExitStatus>
    where
        S: AsRef<str>,
        D: Into<Cow<'static, str>>;
}

impl CommandLogging for Command {
    fn build_status<T, U>(self, image_ref: T, message: U) -> Result<ExitStatus>
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        let ansi_color = gen_random_ansi_color();
        let name = color_str(image_ref.as_ref(), ansi_color);
        let short_name = color_str(shorten_name(image_ref.as_ref()), ansi_color);

        stream_status(
            self,
            short_name,
            format!("{message} {name}", message = message.as_ref()).into(),
        )
    }

    fn message_status<S, D>(self, header: S, message: D) -> Result<ExitStatus>
    where
        S: AsRef<str>,
        D: Into<Cow<'static, str>>,
    {
        let header = color_str(header, gen_random_ansi_color());

        stream_status(self, header, message.into())
    }
}

fn stream_status(
    mut command: Command,
    header: String,
    message: Cow<'static, str>,
) -> Result<ExitStatus> {
    let (reader, writer) = os_pipe::pipe()?;

    command
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .stdin(Stdio::null());

    let progress =
        Logger::multi_progress().add(ProgressBar::new_spinner().with_message(message));
    progress.enable_steady_tick(Duration::from_millis(100));

    let mut child = command.spawn()?;

    // We drop the `Command` to prevent blocking on writer
    // https://docs.rs/os_pipe/latest/os_pipe/#examples
    drop(command);

    let reader = BufReader::new(reader);

    let printer = thread::spawn(move || {
        let mp = Logger::multi_progress();
        reader.lines().map_while(Result::ok).for_each(|line| {
            let text = format!("{log_prefix} {line}", log_prefix = log_header(&header));
            if mp.is_hidden() || mp.println(&text).is_err() {
                eprintln!("{text}");
            }
        });
    });

    let status = child.wait()?;
    let _ = printer.join();

    progress.finish();
    Logger::multi_progress().remove(&progress);

    Ok(status)
}

#[derive(Debug)]
struct CustomPatternEncoder;

impl Encode for CustomPatternEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        match log::max_level() {
            LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => Ok(writeln!(
                w,
                "{prefix} {args}",
                prefix = log_header(format!(
                    "{level:width$}",
                    level = record.level().colored(),
                    width = 5,
                )),
                args = record.args(),
            )?),
            LevelFilter::Debug => Ok(writeln!(
                w,
                "{prefix} {args}",
                prefix = log_header(format!(
                    "{level:>width$}",
                    level = record.level().colored(),
                    width = 5,
                )),
                args = record.args(),
            )?),
            LevelFilter::Trace => Ok(writeln!(
                w,
                "{prefix} {args}",
                prefix = log_header(format!(
                    "{level:width$} {module}:{line}",
                    level = record.level().colored(),
                    width = 5,
                    module = record.module_path().unwrap_or_default().bright_yellow(),
                    line = record
                        .line()
                        .map_or_else(String::new, |l| l.to_string())
                        .bright_green(),
                )),
                args = record.args(),
            )?),
            LevelFilter::Off => Ok(()),
        }
    }
}

/// Used to keep the style of logs consistent between
/// normal log use and command output.
fn log_header<T>(text: T) -> String
where
    T: AsRef<str>,
{
    let text = text.as_ref();

    match log::max_level() {
        LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => {
            format!("{text} {sep}", sep = "=>".bold())
        }
        LevelFilter::Debug | LevelFilter::Trace => format!(
            "[{time} {text}] {sep}",
            time = Local::now().format("%H:%M:%S"),
            sep = "=>".bold(),
        ),
        LevelFilter::Off => String::new(),
    }
}

/// Shortens the image name so that it won't take up the
/// entire width of the terminal.
///
/// # Examples
/// `ghcr.io/test-owner/app:latest` -> `g.i/t/app:latest`
/// `registry.gitlab.com/some/namespace/image:latest` -> `r.g.c/s/n/image:latest`
#[must_use]
fn shorten_name(text: &str) -> String {
    let (path, tag) = match text.rsplit_once(':') {
        Some((path, tag)) if !tag.contains('/') => (path, Some(tag)),
        _ => (text, None),
    };

    let path_parts = path.split('/').collect::<Vec<_>>();
    let last = path_parts.len() - 1;

    let joined_path = path_parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i < last {
                part.split('.')
                    .filter_map(|p| p.chars().next())
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(".")
            } else {
                (*part).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    match tag {
        Some(t) => format!("{joined_path}:{t}"),
        None => joined_path,
    }
}

#[must_use]
pub fn gen_random_ansi_color() -> u8 {
    // ANSI extended color range
    // https://www.ditig.com/publications/256-colors-cheat-sheet
    const LOW_END: u8 = 21; // Blue1 #0000ff rgb(0,0,255) hsl(240,100%,50%)
    const HIGH_END: u8 = 230; // Cornsilk1 #ffffd7 rgb(255,255,215) hsl(60,100%,92%)

    rand::rng().random_range(LOW_END..=HIGH_END)
}

pub fn color_str<T>(text: T, ansi_color: u8) -> String
where
    T: AsRef<str>,
{
    if ShouldColorize::from_env().should_colorize() {
        Color::Fixed(ansi_color)
            .paint(text.as_ref().to_string())
            .to_string()
    } else {
        text.as_ref().to_string()
    }
}
