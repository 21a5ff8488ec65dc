use log::info;
use miette::Result;
use semver::{Version, VersionReq};

use super::{
    functions::print_outputs,
    opts::{BuildOpts, MetadataOpts},
    types::{BuildOutput, CiContext, GeneratedMetadata},
};

/// Determines the driver to use when
/// the user hasn't picked one.
pub trait DetermineDriver<T> {
    fn determine_driver(&mut self) -> T;
}

/// Trait for retrieving version of a driver.
pub trait DriverVersion {
    /// The version req string slice that follows
    /// the semver standard <https://semver.org/>.
    const VERSION_REQ: &'static str;

    /// Returns the version of the driver.
    ///
    /// # Errors
    /// Will error if it can't retrieve the version.
    fn version() -> Result<Version>;

    #[must_use]
    fn is_supported_version() -> bool {
        Self::version().is_ok_and(|version| {
            VersionReq::parse(Self::VERSION_REQ).is_ok_and(|req| req.matches(&version))
        })
    }
}

/// Hands the image build over to an external build engine.
pub trait BuildDriver {
    /// Builds the image, applying every tag and label
    /// and pushing or loading the result if asked.
    ///
    /// The image id, digest, and metadata the build engine
    /// reports are passed back untouched.
    ///
    /// # Errors
    /// Will error if the build fails.
    fn build(opts: &BuildOpts) -> Result<BuildOutput>;
}

/// Allows agnostic retrieval of CI-based information.
pub trait CiDriver {
    /// Collects the commit, ref, and repository
    /// information of the current run.
    ///
    /// # Errors
    /// Will error if the CI environment can't be read.
    fn context() -> Result<CiContext>;

    /// Publishes named outputs for later steps in the pipeline.
    ///
    /// # Errors
    /// Will error if the outputs can't be written.
    fn set_outputs(outputs: &[(&str, &str)]) -> Result<()> {
        print_outputs(outputs);
        Ok(())
    }

    /// Publishes a markdown summary of the run.
    ///
    /// # Errors
    /// Will error if the summary can't be written.
    fn write_summary(markdown: &str) -> Result<()> {
        info!("Summary:\n{markdown}");
        Ok(())
    }
}

/// Generates image metadata from the
/// image names and tags being built.
pub trait MetadataDriver {
    /// Derives the full tag list and the labels
    /// for the images.
    ///
    /// # Errors
    /// Will error if the metadata can't be generated.
    fn generate(opts: &MetadataOpts) -> Result<GeneratedMetadata>;
}
