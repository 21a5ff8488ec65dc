use buildpush::commands::{BuildPushArgs, BuildPushCommand, CommandArgs};
use buildpush_process_management::logging::Logger;
use clap::Parser;
use log::trace;

fn main() {
    let args = BuildPushArgs::parse();

    Logger::new()
        .filter_level(args.verbosity.log_level_filter())
        .log_out_dir(args.log_out.as_ref())
        .init();

    trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Build(mut command) => command.run(),
        CommandArgs::Tags(mut command) => command.run(),
        CommandArgs::Completions(mut command) => command.run(),
    }
}
