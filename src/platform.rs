//! Platform detection: operating system, privileges and package manager.
use std::fmt;

use crate::exec::Executor;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Any other Unix-like system.
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// System package managers that can install build tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian/Ubuntu.
    Apt,
    /// Fedora/RHEL.
    Dnf,
    /// Arch Linux.
    Pacman,
    /// Alpine.
    Apk,
    /// Homebrew.
    Brew,
}

impl PackageManager {
    /// Probe order used by [`Platform::detect`].
    pub const ALL: [Self; 5] = [Self::Apt, Self::Dnf, Self::Pacman, Self::Apk, Self::Brew];

    /// Executable that identifies this package manager.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Apk => "apk",
            Self::Brew => "brew",
        }
    }

    /// Whether installing packages needs root.
    #[must_use]
    pub const fn needs_root(self) -> bool {
        !matches!(self, Self::Brew)
    }

    /// Commands (program + args) that install the build tools, in order.
    #[must_use]
    pub fn build_tools_commands(self) -> Vec<Vec<&'static str>> {
        match self {
            Self::Apt => vec![
                vec!["apt-get", "update"],
                vec![
                    "apt-get",
                    "install",
                    "-y",
                    "build-essential",
                    "pkg-config",
                    "libssl-dev",
                    "git",
                ],
            ],
            Self::Dnf => vec![vec![
                "dnf",
                "install",
                "-y",
                "gcc",
                "gcc-c++",
                "make",
                "pkgconf-pkg-config",
                "openssl-devel",
                "git",
            ]],
            Self::Pacman => vec![vec![
                "pacman",
                "-Sy",
                "--needed",
                "--noconfirm",
                "base-devel",
                "pkgconf",
                "openssl",
                "git",
            ]],
            Self::Apk => vec![vec![
                "apk",
                "add",
                "build-base",
                "pkgconf",
                "openssl-dev",
                "git",
            ]],
            Self::Brew => vec![vec!["brew", "install", "pkg-config", "openssl", "git"]],
        }
    }

    /// The install commands as a single line the user can paste, prefixed
    /// with `sudo` where root is needed.
    #[must_use]
    pub fn remediation(self) -> String {
        let prefix = if self.needs_root() { "sudo " } else { "" };
        self.build_tools_commands()
            .iter()
            .map(|c| format!("{prefix}{}", c.join(" ")))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// Whether the effective user is root.
    pub is_root: bool,
    /// First supported package manager found on PATH.
    pub package_manager: Option<PackageManager>,
}

impl Platform {
    /// Detect the current platform, probing package managers on `path`.
    #[must_use]
    pub fn detect(executor: &dyn Executor, path: &str) -> Self {
        Self {
            os: Self::detect_os(),
            is_root: nix::unistd::geteuid().is_root(),
            package_manager: PackageManager::ALL
                .into_iter()
                .find(|pm| executor.which_in(pm.program(), path).is_some()),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, is_root: bool, package_manager: Option<PackageManager>) -> Self {
        Self {
            os,
            is_root,
            package_manager,
        }
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Other
        }
    }
}
