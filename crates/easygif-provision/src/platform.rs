//! Host platform detection, binary naming and the toolkit support matrix.

use std::fmt;

/// Addon component name used in `{arch}-{platform}-{component}` file names.
pub const ADDON_COMPONENT: &str = "easygif.node";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Arm64,
}

impl Arch {
    /// Map a Rust target architecture; anything unknown is treated as x64.
    pub fn from_target(arch: &str) -> Self {
        match arch {
            "aarch64" | "arm64" => Arch::Arm64,
            _ => Arch::X64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    MacOs,
    Linux,
}

impl Os {
    /// Map a Rust target OS; anything unknown is treated as Linux.
    pub fn from_target(os: &str) -> Self {
        match os {
            "windows" | "win32" => Os::Windows,
            "macos" | "darwin" => Os::MacOs,
            _ => Os::Linux,
        }
    }

    /// Label used in release asset names.
    pub fn label(&self) -> &'static str {
        match self {
            Os::Windows => "msvc",
            Os::MacOs => "darwin",
            Os::Linux => "linux",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub arch: Arch,
    pub os: Os,
}

impl Platform {
    pub fn new(arch: Arch, os: Os) -> Self {
        Self { arch, os }
    }

    pub fn current() -> Self {
        Self::new(
            Arch::from_target(std::env::consts::ARCH),
            Os::from_target(std::env::consts::OS),
        )
    }

    /// Parse `{arch}-{platform}` as printed by [`Display`](fmt::Display).
    pub fn parse(value: &str) -> Option<Self> {
        let (arch, os) = value.split_once('-')?;
        let arch = match arch {
            "x64" => Arch::X64,
            "arm64" => Arch::Arm64,
            _ => return None,
        };
        let os = match os {
            "msvc" | "windows" => Os::Windows,
            "darwin" | "macos" => Os::MacOs,
            "linux" => Os::Linux,
            _ => return None,
        };
        Some(Self::new(arch, os))
    }

    /// `{arch}-{platform}-{component}`
    pub fn binary_name(&self, component: &str) -> String {
        format!("{}-{}", self, component)
    }

    pub fn addon_binary_name(&self) -> String {
        self.binary_name(ADDON_COMPONENT)
    }

    /// Executable file name for `stem` on this platform.
    pub fn executable(&self, stem: &str) -> String {
        match self.os {
            Os::Windows => format!("{}.exe", stem),
            Os::MacOs | Os::Linux => stem.to_string(),
        }
    }

    pub fn toolkit_support(&self) -> ToolkitSupport {
        toolkit_support(*self)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch.as_str(), self.os.label())
    }
}

/// Where a prebuilt FFmpeg archive comes from and what to take out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitSource {
    pub url: String,
    pub entries: Vec<String>,
}

impl ToolkitSource {
    /// BtbN FFmpeg build for `flavor` (`win64`, `winarm64`).
    fn btbn(flavor: &str) -> Self {
        let root = format!("ffmpeg-master-latest-{}-gpl", flavor);
        Self {
            url: format!(
                "https://github.com/BtbN/FFmpeg-Builds/releases/download/latest/{}.zip",
                root
            ),
            entries: vec![
                format!("{}/bin/ffmpeg.exe", root),
                format!("{}/bin/ffprobe.exe", root),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitSupport {
    AutoFetch(ToolkitSource),
    /// Not auto-provisionable; the user has to supply the binaries.
    Manual,
}

/// The toolkit support matrix, arch × OS.
pub fn toolkit_support(platform: Platform) -> ToolkitSupport {
    match (platform.os, platform.arch) {
        (Os::Windows, Arch::X64) => ToolkitSupport::AutoFetch(ToolkitSource::btbn("win64")),
        (Os::Windows, Arch::Arm64) => ToolkitSupport::AutoFetch(ToolkitSource::btbn("winarm64")),
        (Os::MacOs, _) | (Os::Linux, _) => ToolkitSupport::Manual,
    }
}
