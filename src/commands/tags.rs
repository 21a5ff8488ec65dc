use buildpush_process_management::drivers::{CiDriver, Driver, DriverArgs};
use clap::Args;
use log::trace;
use miette::{IntoDiagnostic, Result};

use crate::{commands::ResolveArgs, resolver::resolve, target::tags_list};

use super::BuildPushCommand;

#[derive(Debug, Args)]
pub struct TagsCommand {
    #[clap(flatten)]
    resolve: ResolveArgs,

    /// Print the targets as a JSON array of
    /// `{"image", "tag"}` objects.
    #[arg(long)]
    json: bool,

    #[clap(flatten)]
    drivers: DriverArgs,
}

impl BuildPushCommand for TagsCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("TagsCommand::try_run()");

        Driver::init(self.drivers);

        let request = self.resolve.request()?;
        let targets = resolve(&request, &Driver::context()?)?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&targets).into_diagnostic()?
            );
        } else {
            println!("{}", tags_list(&targets));
        }

        Ok(())
    }
}
