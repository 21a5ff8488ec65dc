/// Creates or modifies a `std::process::Command` adding args.
///
/// # Examples
/// ```
/// use buildpush_utils::cmd;
///
/// const NAME: &str = "Bob";
/// let mut command = cmd!("echo", "Hello world!");
/// cmd!(command, "This is Joe.");
/// cmd!(command, format!("And this is {NAME}"));
/// command.status().unwrap();
/// ```
#[macro_export]
macro_rules! cmd {
    ($command:expr) => {
        {
            ::std::process::Command::new($command)
        }
    };
    ($command:literal, $($arg:expr),+ $(,)?) => {
        {
            let mut c = $crate::cmd!($command);
            c$(.arg($arg))*;
            c
        }
    };
    ($command:ident, $($arg:expr),+ $(,)?) => {
        {
            $command$(.arg($arg))*;
        }
    };
}

/// Creates a `String` from any value that
/// implements `ToString`.
#[macro_export]
macro_rules! string {
    ($str:expr) => {
        ::std::string::ToString::to_string(&$str)
    };
}

/// Creates a `Vec<String>` from a list of values.
#[macro_export]
macro_rules! string_vec {
    ($($string:expr),* $(,)?) => {
        {
            vec![
                $($crate::string!($string),)*
            ]
        }
    };
}
