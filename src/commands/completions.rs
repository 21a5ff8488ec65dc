use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use log::debug;
use miette::Result;

use crate::commands::BuildPushArgs;

use super::BuildPushCommand;

#[derive(Debug, Clone, Args)]
pub struct CompletionsCommand {
    #[arg(value_enum)]
    shell: Shell,
}

impl BuildPushCommand for CompletionsCommand {
    fn try_run(&mut self) -> Result<()> {
        debug!("Generating completions for {shell}", shell = self.shell);

        generate(
            self.shell,
            &mut BuildPushArgs::command(),
            "buildpush",
            &mut std::io::stdout().lock(),
        );

        Ok(())
    }
}
