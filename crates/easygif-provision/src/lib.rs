//! Provisioning of the native binaries easygif needs at runtime.
//!
//! At build time [`package::package`] writes a raw-DEFLATE `.dfl` sidecar next
//! to the native addon. At install time a [`ProvisionPlan`] finds out what is
//! missing from the binaries directory and a [`Provisioner`] downloads it: the
//! addon as a sidecar from the project's releases, FFmpeg as a third-party ZIP
//! archive from which only `ffmpeg` and `ffprobe` are extracted.

pub mod archive;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod output;
pub mod package;
pub mod platform;
pub mod progress;
pub mod provision;

pub use config::ProvisionConfig;
pub use error::{Error, Result};
pub use output::{Output, Verbosity};
pub use package::{package, sidecar_path, PackagedArtifact};
pub use platform::Platform;
pub use provision::{ProvisionPlan, ProvisionReport, Provisioner};
