//! Executable resolution for agent CLIs.
//!
//! Resolution never fails hard: an unresolved name is reported as
//! [`Resolution::NotFound`] so the launcher can pick a degraded path.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Platform flavour that decides whether the shell-level lookup runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// PATH lookup misses script shims (`.cmd`, `.ps1`) often enough that a
    /// second opinion from PowerShell is worth asking for.
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Outcome of resolving an executable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Caller-supplied override, taken verbatim.
    Explicit(String),
    /// Found on the search path.
    OnPath(PathBuf),
    /// Found by the platform shell's command lookup.
    ViaShell(PathBuf),
    NotFound,
}

impl Resolution {
    /// The program to launch, if resolution succeeded.
    pub fn executable(&self) -> Option<String> {
        match self {
            Resolution::Explicit(name) => Some(name.clone()),
            Resolution::OnPath(path) | Resolution::ViaShell(path) => {
                Some(path.to_string_lossy().into_owned())
            }
            Resolution::NotFound => None,
        }
    }
}

/// Looks up agent executables.
#[derive(Debug, Clone)]
pub struct Resolver {
    platform: Platform,
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl Resolver {
    /// Resolver for the running process: its platform, `PATH`, and `cwd`.
    pub fn from_env(cwd: &Path) -> Self {
        Self::new(Platform::current(), env::var_os("PATH"), cwd)
    }

    /// Resolver with an explicit platform and search path.
    pub fn new(platform: Platform, search_path: Option<OsString>, cwd: &Path) -> Self {
        Self {
            platform,
            search_path,
            cwd: cwd.to_path_buf(),
        }
    }

    /// Resolve `name`, preferring `explicit` when given.
    ///
    /// The override is not checked for existence here; a stale override is
    /// caught when the launcher tries to start it.
    pub fn resolve(&self, name: &str, explicit: Option<&str>) -> Resolution {
        if let Some(explicit) = explicit {
            debug!(executable = explicit, "using explicit executable override");
            return Resolution::Explicit(explicit.to_string());
        }

        if let Ok(path) = which::which_in(name, self.search_path.as_ref(), &self.cwd) {
            debug!(executable = %path.display(), "resolved on search path");
            return Resolution::OnPath(path);
        }

        if self.platform == Platform::Windows
            && let Some(path) = shell_lookup(name)
        {
            debug!(executable = %path.display(), "resolved through PowerShell");
            return Resolution::ViaShell(path);
        }

        debug!(name, "executable not found");
        Resolution::NotFound
    }
}

/// Ask PowerShell where `name` lives, the way `Get-Command` would find it.
///
/// Each shell is tried in turn; a missing shell or empty answer moves on.
fn shell_lookup(name: &str) -> Option<PathBuf> {
    let script = format!(
        "(Get-Command '{}' -ErrorAction SilentlyContinue) | Select-Object -ExpandProperty Source",
        name.replace('\'', "''")
    );

    for shell in ["powershell", "pwsh"] {
        let output = match Command::new(shell)
            .args(["-NoProfile", "-Command", script.as_str()])
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!(shell, error = %e, "shell lookup unavailable");
                continue;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(candidate) = first_existing_candidate(&stdout) {
            return Some(candidate);
        }
    }

    None
}

/// First non-empty line of `output` that names an existing file.
fn first_existing_candidate(output: &str) -> Option<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .find(|path| path.exists())
}
