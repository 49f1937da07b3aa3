//! Presence detection for the native components.

use std::fmt;
use std::path::PathBuf;

use crate::config::ProvisionConfig;
use crate::platform::{Platform, ToolkitSupport};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// FFmpeg (`ffmpeg` + `ffprobe`)
    Toolkit,
    /// The easygif native addon
    Addon,
}

impl Component {
    pub fn label(&self) -> &'static str {
        match self {
            Component::Toolkit => "FFMPEG binaries",
            Component::Addon => "EasyGIF binaries",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Present,
    Missing,
    /// Toolkit with `ffmpeg` but no `ffprobe`
    Incomplete,
}

impl PresenceState {
    pub fn is_present(&self) -> bool {
        matches!(self, PresenceState::Present)
    }
}

/// How an absent component gets onto disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remedy {
    /// Download a `.dfl` sidecar and inflate it to `target`.
    FetchSidecar { url: String, target: PathBuf },
    /// Download a ZIP and write `entries` into `target_dir` by base name.
    FetchArchive {
        url: String,
        entries: Vec<String>,
        target_dir: PathBuf,
    },
    /// Has to be supplied by the user.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentStatus {
    pub component: Component,
    pub state: PresenceState,
    pub remedy: Remedy,
    /// Files that were found for this component
    pub found: Vec<PathBuf>,
}

impl ComponentStatus {
    /// The warning shown when the component is absent.
    pub fn problem(&self) -> Option<String> {
        match (self.component, self.state) {
            (_, PresenceState::Present) => None,
            (Component::Toolkit, PresenceState::Incomplete) => {
                Some("Incomplete FFMPEG installation detected".to_string())
            }
            (component, _) => Some(format!("{} not found", component)),
        }
    }
}

/// The components to provision for one run, toolkit first.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub platform: Platform,
    pub bin_dir: PathBuf,
    pub components: Vec<ComponentStatus>,
}

impl ProvisionPlan {
    pub fn build(config: &ProvisionConfig) -> Self {
        let search = SearchPath::new(config);

        let components = vec![
            toolkit_status(config, &search),
            addon_status(config),
        ];

        for status in &components {
            log::debug!("{}: {:?} ({:?})", status.component, status.state, status.found);
        }

        Self {
            platform: config.platform,
            bin_dir: config.bin_dir.clone(),
            components,
        }
    }

    /// Components that still need provisioning, in run order.
    pub fn pending(&self) -> impl Iterator<Item = &ComponentStatus> {
        self.components.iter().filter(|c| !c.state.is_present())
    }

    pub fn is_satisfied(&self) -> bool {
        self.pending().next().is_none()
    }

    pub fn status(&self, component: Component) -> Option<&ComponentStatus> {
        self.components.iter().find(|c| c.component == component)
    }
}

/// Directories searched for toolkit executables: the binaries directory, then
/// `PATH` when enabled.
struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    fn new(config: &ProvisionConfig) -> Self {
        let mut dirs = vec![config.bin_dir.clone()];
        if config.system_path {
            if let Some(path) = std::env::var_os("PATH") {
                dirs.extend(std::env::split_paths(&path).filter(|d| !d.as_os_str().is_empty()));
            }
        }
        Self { dirs }
    }

    fn find(&self, file_name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}

fn toolkit_status(config: &ProvisionConfig, search: &SearchPath) -> ComponentStatus {
    let platform = config.platform;
    let ffmpeg = search.find(&platform.executable(FFMPEG));
    let ffprobe = search.find(&platform.executable(FFPROBE));

    let state = match (&ffmpeg, &ffprobe) {
        (Some(_), Some(_)) => PresenceState::Present,
        (Some(_), None) => PresenceState::Incomplete,
        (None, _) => PresenceState::Missing,
    };

    let remedy = match platform.toolkit_support() {
        ToolkitSupport::AutoFetch(source) => Remedy::FetchArchive {
            url: config.toolkit_url.clone().unwrap_or(source.url),
            entries: source.entries,
            target_dir: config.bin_dir.clone(),
        },
        ToolkitSupport::Manual => Remedy::Manual,
    };

    ComponentStatus {
        component: Component::Toolkit,
        state,
        remedy,
        found: ffmpeg.into_iter().chain(ffprobe).collect(),
    }
}

fn addon_status(config: &ProvisionConfig) -> ComponentStatus {
    let name = config.platform.addon_binary_name();
    let target = config.bin_dir.join(&name);
    let present = target.is_file();

    ComponentStatus {
        component: Component::Addon,
        state: if present {
            PresenceState::Present
        } else {
            PresenceState::Missing
        },
        remedy: Remedy::FetchSidecar {
            url: config.sidecar_url(&name),
            target: target.clone(),
        },
        found: if present { vec![target] } else { Vec::new() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(bin_dir: &Path, platform: Platform) -> ProvisionConfig {
        ProvisionConfig {
            bin_dir: bin_dir.to_path_buf(),
            release_url: "https://example.com/easygif".to_string(),
            version: "1.0.0".to_string(),
            platform,
            system_path: false,
            ..ProvisionConfig::default()
        }
    }

    #[test]
    fn test_empty_bin_dir_is_missing_everything() {
        let temp = TempDir::new().unwrap();
        let plan = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Windows)));

        assert_eq!(plan.components.len(), 2);
        assert_eq!(plan.components[0].component, Component::Toolkit);
        assert_eq!(plan.components[0].state, PresenceState::Missing);
        assert_eq!(plan.components[1].component, Component::Addon);
        assert_eq!(plan.components[1].state, PresenceState::Missing);
        assert!(!plan.is_satisfied());
        assert_eq!(plan.pending().count(), 2);
    }

    #[test]
    fn test_addon_remedy_points_at_release_sidecar() {
        let temp = TempDir::new().unwrap();
        let plan = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Windows)));

        let addon = plan.status(Component::Addon).unwrap();
        assert_eq!(
            addon.remedy,
            Remedy::FetchSidecar {
                url: "https://example.com/easygif/releases/download/v1.0.0/x64-msvc-easygif.node.dfl"
                    .to_string(),
                target: temp.path().join("x64-msvc-easygif.node"),
            }
        );
    }

    #[test]
    fn test_toolkit_remedy_follows_support_matrix() {
        let temp = TempDir::new().unwrap();

        let windows = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::Arm64, Os::Windows)));
        match &windows.status(Component::Toolkit).unwrap().remedy {
            Remedy::FetchArchive { url, entries, target_dir } => {
                assert!(url.ends_with("ffmpeg-master-latest-winarm64-gpl.zip"));
                assert_eq!(entries.len(), 2);
                assert_eq!(target_dir, temp.path());
            }
            other => panic!("unexpected remedy {:?}", other),
        }

        let linux = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Linux)));
        assert_eq!(linux.status(Component::Toolkit).unwrap().remedy, Remedy::Manual);
    }

    #[test]
    fn test_toolkit_url_override() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path(), Platform::new(Arch::X64, Os::Windows));
        config.toolkit_url = Some("http://mirror.local/ffmpeg.zip".to_string());

        let plan = ProvisionPlan::build(&config);
        match &plan.status(Component::Toolkit).unwrap().remedy {
            Remedy::FetchArchive { url, .. } => assert_eq!(url, "http://mirror.local/ffmpeg.zip"),
            other => panic!("unexpected remedy {:?}", other),
        }
    }

    #[test]
    fn test_ffmpeg_without_ffprobe_is_incomplete() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ffmpeg"), b"").unwrap();

        let plan = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Linux)));
        let toolkit = plan.status(Component::Toolkit).unwrap();
        assert_eq!(toolkit.state, PresenceState::Incomplete);
        assert_eq!(
            toolkit.problem().as_deref(),
            Some("Incomplete FFMPEG installation detected")
        );
    }

    #[test]
    fn test_everything_present() {
        let temp = TempDir::new().unwrap();
        for name in ["ffmpeg.exe", "ffprobe.exe", "x64-msvc-easygif.node"] {
            fs::write(temp.path().join(name), b"").unwrap();
        }

        let plan = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Windows)));
        assert!(plan.is_satisfied());
        assert_eq!(plan.status(Component::Toolkit).unwrap().found.len(), 2);
        assert!(plan.components.iter().all(|c| c.problem().is_none()));
    }

    #[test]
    fn test_missing_messages() {
        let temp = TempDir::new().unwrap();
        let plan = ProvisionPlan::build(&config(temp.path(), Platform::new(Arch::X64, Os::Linux)));

        assert_eq!(
            plan.status(Component::Toolkit).unwrap().problem().as_deref(),
            Some("FFMPEG binaries not found")
        );
        assert_eq!(
            plan.status(Component::Addon).unwrap().problem().as_deref(),
            Some("EasyGIF binaries not found")
        );
    }
}
