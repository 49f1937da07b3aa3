//! Configuration flags shared by `install` and `status`.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

use easygif_provision::config::TerminalFeatures;
use easygif_provision::{Platform, ProvisionConfig};

#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Working directory (easygif.toml is searched from here upward)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Directory the binaries are installed into
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Repository URL release sidecars are downloaded from
    #[arg(long, value_name = "URL")]
    pub release_url: Option<String>,

    /// Release version to download (defaults to this tool's version)
    #[arg(long, value_name = "VERSION")]
    pub release_version: Option<String>,

    /// Download FFmpeg from this URL instead of the default build
    #[arg(long, value_name = "URL")]
    pub toolkit_url: Option<String>,

    /// Provision for another platform, e.g. arm64-msvc
    #[arg(long, value_name = "ARCH-PLATFORM")]
    pub platform: Option<String>,

    /// Ignore ffmpeg/ffprobe found on PATH
    #[arg(long)]
    pub no_system_path: bool,

    /// Disable the download progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Maximum number of redirects to follow
    #[arg(long, value_name = "N")]
    pub max_redirects: Option<u32>,

    /// Give up on a download after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl ConfigArgs {
    /// Load the configuration for the working directory and apply the flags on top.
    pub fn resolve(&self, terminal: TerminalFeatures) -> Result<ProvisionConfig> {
        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to determine working directory")?,
        };
        let working_dir = working_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve working directory {}", working_dir.display()))?;

        let mut config = ProvisionConfig::load(&working_dir, terminal)?;
        self.apply(&mut config, &working_dir)?;
        Ok(config)
    }

    /// Relative paths in the flags resolve against `working_dir`.
    fn apply(&self, config: &mut ProvisionConfig, working_dir: &Path) -> Result<()> {
        if let Some(bin_dir) = &self.bin_dir {
            config.bin_dir = working_dir.join(bin_dir);
        }
        if let Some(url) = &self.release_url {
            config.release_url = url.clone();
        }
        if let Some(version) = &self.release_version {
            config.version = version.clone();
        }
        if let Some(url) = &self.toolkit_url {
            config.toolkit_url = Some(url.clone());
        }
        if let Some(platform) = &self.platform {
            match Platform::parse(platform) {
                Some(platform) => config.platform = platform,
                None => bail!("Unknown platform {:?} (expected e.g. x64-msvc, arm64-darwin, x64-linux)", platform),
            }
        }
        if self.no_system_path {
            config.system_path = false;
        }
        if self.no_progress {
            config.progress = false;
        }
        if let Some(max_redirects) = self.max_redirects {
            config.download.max_redirects = max_redirects;
        }
        if let Some(secs) = self.timeout {
            config.download.timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }
}
