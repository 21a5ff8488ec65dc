//! This module is responsible for managing various strategies
//! to perform actions throughout the program. This hides all
//! the implementation details from the command logic.

use std::sync::{LazyLock, Mutex, RwLock};

use bon::Builder;
use buildpush_utils::constants::{BP_BUILD_DRIVER, BP_CI_DRIVER};
use clap::Args;
use log::trace;
use miette::Result;

use self::{
    docker_driver::DockerDriver,
    github_driver::GithubDriver,
    gitlab_driver::GitlabDriver,
    local_driver::LocalDriver,
    oci_metadata_driver::OciMetadataDriver,
    opts::{BuildOpts, MetadataOpts},
    podman_driver::PodmanDriver,
    types::{BuildDriverType, BuildOutput, CiContext, CiDriverType, GeneratedMetadata},
};

pub use traits::*;

mod docker_driver;
mod functions;
mod github_driver;
mod gitlab_driver;
mod local_driver;
mod oci_metadata_driver;
pub mod opts;
mod podman_driver;
mod traits;
pub mod types;

static INIT: LazyLock<Mutex<bool>> = LazyLock::new(|| Mutex::new(false));
static SELECTED_BUILD_DRIVER: LazyLock<RwLock<Option<BuildDriverType>>> =
    LazyLock::new(|| RwLock::new(None));
static SELECTED_CI_DRIVER: LazyLock<RwLock<Option<CiDriverType>>> =
    LazyLock::new(|| RwLock::new(None));

/// Args for selecting the various drivers to use for runtime.
///
/// If the args are left uninitialized, the program will determine
/// the best one available.
#[derive(Default, Clone, Copy, Debug, Builder, Args)]
pub struct DriverArgs {
    /// Select which driver to use to build
    /// your image.
    #[arg(short = 'B', long, env = BP_BUILD_DRIVER)]
    build_driver: Option<BuildDriverType>,

    /// Select which CI system to read
    /// build context from.
    #[arg(long = "ci", env = BP_CI_DRIVER)]
    ci_driver: Option<CiDriverType>,
}

pub struct Driver;

impl Driver {
    /// Initializes the drivers with the user's selection.
    ///
    /// The CI driver is determined right away. The build driver
    /// is only determined on first use so that a dry run doesn't
    /// require docker or podman to be installed.
    ///
    /// # Panics
    /// Will panic if it is unable to lock the driver selection.
    pub fn init(mut args: DriverArgs) {
        trace!("Driver::init({args:?})");

        let mut initialized = INIT.lock().expect("Must lock INIT");

        if !*initialized {
            let mut build_driver = SELECTED_BUILD_DRIVER.write().expect("Should lock");
            *build_driver = args.build_driver;
            drop(build_driver);

            let mut ci_driver = SELECTED_CI_DRIVER.write().expect("Should lock");
            *ci_driver = Some(args.ci_driver.determine_driver());
            trace!("CI driver set {ci_driver:?}");
            drop(ci_driver);

            *initialized = true;
        }
    }

    fn get_build_driver() -> BuildDriverType {
        let mut lock = SELECTED_BUILD_DRIVER.write().expect("Should lock");
        let driver = lock.determine_driver();
        trace!("Build driver {driver:?}");
        drop(lock);
        driver
    }

    fn get_ci_driver() -> CiDriverType {
        let lock = SELECTED_CI_DRIVER.read().expect("Should read");
        lock.expect("Driver should have initialized CI driver")
    }
}

macro_rules! impl_build_driver {
    ($func:ident($($args:expr),*)) => {
        match Self::get_build_driver() {
            BuildDriverType::Docker => DockerDriver::$func($($args,)*),
            BuildDriverType::Podman => PodmanDriver::$func($($args,)*),
        }
    };
}

impl BuildDriver for Driver {
    fn build(opts: &BuildOpts) -> Result<BuildOutput> {
        impl_build_driver!(build(opts))
    }
}

macro_rules! impl_ci_driver {
    ($func:ident($($args:expr),*)) => {
        match Self::get_ci_driver() {
            CiDriverType::Local => LocalDriver::$func($($args,)*),
            CiDriverType::Gitlab => GitlabDriver::$func($($args,)*),
            CiDriverType::Github => GithubDriver::$func($($args,)*),
        }
    };
}

impl CiDriver for Driver {
    fn context() -> Result<CiContext> {
        impl_ci_driver!(context())
    }

    fn set_outputs(outputs: &[(&str, &str)]) -> Result<()> {
        impl_ci_driver!(set_outputs(outputs))
    }

    fn write_summary(markdown: &str) -> Result<()> {
        impl_ci_driver!(write_summary(markdown))
    }
}

impl MetadataDriver for Driver {
    fn generate(opts: &MetadataOpts) -> Result<GeneratedMetadata> {
        OciMetadataDriver::generate(opts)
    }
}
