//! Installer configuration.
//!
//! Values are resolved once at startup, in increasing priority:
//!
//! 1. Built-in defaults (release URL and version come from the package metadata)
//! 2. `easygif.toml`, searched upward from the working directory
//! 3. `EASYGIF_*` environment variables
//! 4. Command line flags, applied by the caller
//!
//! Terminal capabilities are probed once by the caller and stored here, so
//! nothing downstream reads process-global state.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::http::DownloadConfig;
use crate::platform::Platform;

pub const CONFIG_FILE: &str = "easygif.toml";
pub const DEFAULT_BIN_DIR: &str = "bin";
pub const DEFAULT_RELEASE_URL: &str = env!("CARGO_PKG_REPOSITORY");
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The `easygif.toml` file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub install: InstallSection,
    pub release: ReleaseSection,
    pub download: DownloadSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InstallSection {
    /// Binaries directory, relative to the config file
    pub bin_dir: Option<PathBuf>,

    /// Also look for ffmpeg/ffprobe on PATH
    pub system_path: Option<bool>,

    /// Draw the download progress panel
    pub progress: Option<bool>,

    /// Override the detected `{arch}-{platform}` pair
    pub platform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReleaseSection {
    /// Repository URL the `.dfl` sidecars are published under
    pub url: Option<String>,

    pub version: Option<String>,

    /// Mirror for the FFmpeg archive
    pub toolkit_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadSection {
    pub max_redirects: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub proxy: Option<String>,
}

impl FileConfig {
    /// Find `easygif.toml` in `start_dir` or any parent.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// What the terminal can do, probed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalFeatures {
    pub ansi: bool,
    pub columns: u16,
}

impl TerminalFeatures {
    /// Probe stdout, the stream both `info` output and the progress bar use.
    pub fn detect() -> Self {
        let term = console::Term::stdout();
        let ansi = term.is_term() && console::colors_enabled();
        let (_rows, columns) = term.size();
        Self { ansi, columns }
    }

    pub fn plain() -> Self {
        Self {
            ansi: false,
            columns: 80,
        }
    }
}

/// Fully resolved installer settings.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub bin_dir: PathBuf,
    pub release_url: String,
    pub version: String,
    pub toolkit_url: Option<String>,
    pub platform: Platform,
    pub system_path: bool,
    pub progress: bool,
    pub terminal: TerminalFeatures,
    pub download: DownloadConfig,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            release_url: DEFAULT_RELEASE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            toolkit_url: None,
            platform: Platform::current(),
            system_path: true,
            progress: true,
            terminal: TerminalFeatures::plain(),
            download: DownloadConfig::default(),
        }
    }
}

impl ProvisionConfig {
    /// Resolve defaults, config file and environment for `start_dir`.
    pub fn load(start_dir: &Path, terminal: TerminalFeatures) -> Result<Self> {
        let mut config = Self {
            bin_dir: start_dir.join(DEFAULT_BIN_DIR),
            terminal,
            ..Self::default()
        };

        if let Some(path) = FileConfig::find(start_dir) {
            log::debug!("Reading {}", path.display());
            let file = FileConfig::read(&path)?;
            let base = path.parent().unwrap_or(start_dir);
            config.apply_file(file, base)?;
        }

        config.apply_env(start_dir)?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig, base: &Path) -> Result<()> {
        let FileConfig {
            install,
            release,
            download,
        } = file;

        if let Some(bin_dir) = install.bin_dir {
            self.bin_dir = base.join(bin_dir);
        }
        if let Some(system_path) = install.system_path {
            self.system_path = system_path;
        }
        if let Some(progress) = install.progress {
            self.progress = progress;
        }
        if let Some(platform) = install.platform {
            self.platform = parse_platform(&platform)?;
        }

        if let Some(url) = release.url {
            self.release_url = url;
        }
        if let Some(version) = release.version {
            self.version = version;
        }
        if release.toolkit_url.is_some() {
            self.toolkit_url = release.toolkit_url;
        }

        if let Some(max_redirects) = download.max_redirects {
            self.download.max_redirects = max_redirects;
        }
        if let Some(secs) = download.timeout_secs {
            self.download.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(secs) = download.connect_timeout_secs {
            self.download.connect_timeout = Some(Duration::from_secs(secs));
        }
        if download.proxy.is_some() {
            self.download.proxy = download.proxy;
        }

        Ok(())
    }

    pub fn apply_env(&mut self, base: &Path) -> Result<()> {
        self.apply_env_from(base, |key| std::env::var(key).ok())
    }

    /// Apply `EASYGIF_*` overrides read through `get`. A relative
    /// `EASYGIF_BIN_DIR` resolves against `base`.
    pub fn apply_env_from<F>(&mut self, base: &Path, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bin_dir) = get("EASYGIF_BIN_DIR") {
            self.bin_dir = base.join(bin_dir);
        }
        if let Some(url) = get("EASYGIF_RELEASE_URL") {
            self.release_url = url;
        }
        if let Some(version) = get("EASYGIF_VERSION") {
            self.version = version;
        }
        if let Some(url) = get("EASYGIF_TOOLKIT_URL") {
            self.toolkit_url = Some(url);
        }
        if let Some(platform) = get("EASYGIF_PLATFORM") {
            self.platform = parse_platform(&platform)?;
        }
        if get("EASYGIF_NO_PROGRESS").is_some_and(|v| !v.is_empty() && v != "0") {
            self.progress = false;
        }
        Ok(())
    }

    /// `{release}/releases/download/v{version}/{asset}.dfl`
    pub fn sidecar_url(&self, binary_name: &str) -> String {
        format!(
            "{}/releases/download/v{}/{}.dfl",
            self.release_url.trim_end_matches('/'),
            self.version.trim_start_matches('v'),
            binary_name
        )
    }
}

fn parse_platform(value: &str) -> Result<Platform> {
    Platform::parse(value).ok_or_else(|| Error::Config(format!("unknown platform {:?}", value)))
}
