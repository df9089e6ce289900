//! Desktop install offer.
//!
//! When the viewer runs from a location that has no launcher entry
//! yet, a single-use install token is captured at startup. The user
//! can open a confirmation card and either accept (a desktop launcher
//! entry is written) or dismiss. Either answer consumes the token;
//! asking again in the same session is a no-op by contract, not by
//! accident. When the environment offers no install location the
//! whole feature silently stays dormant.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::info;

pub const DESKTOP_ENTRY_NAME: &str = "recview.desktop";

/// The one-shot capability to install a launcher entry.
#[derive(Debug)]
pub struct InstallToken {
    applications_dir: PathBuf,
    exe: PathBuf,
}

impl InstallToken {
    fn install(self) -> io::Result<()> {
        fs::create_dir_all(&self.applications_dir)?;
        let entry = format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=recview\n\
             Comment=Spreadsheet record viewer\n\
             Exec={} %f\n\
             Terminal=true\n\
             Categories=Utility;Office;\n",
            self.exe.display()
        );
        let path = self.applications_dir.join(DESKTOP_ENTRY_NAME);
        fs::write(&path, entry)?;
        info!(path = %path.display(), "desktop entry installed");
        Ok(())
    }
}

/// Holder for the install token. `capture` decides availability once,
/// at startup; `accept`/`dismiss` consume the token.
#[derive(Debug, Default)]
pub struct InstallPrompt {
    token: Option<InstallToken>,
}

impl InstallPrompt {
    /// Probe the environment for an install location. Unavailability
    /// (no data dir, no resolvable executable, or already installed)
    /// is not an error; the prompt just never becomes available.
    pub fn capture() -> Self {
        let Some(data_dir) = dirs::data_dir() else {
            return Self::default();
        };
        let Ok(exe) = std::env::current_exe() else {
            return Self::default();
        };
        Self::capture_in(data_dir.join("applications"), exe)
    }

    /// Availability probe against explicit paths.
    pub fn capture_in(applications_dir: PathBuf, exe: PathBuf) -> Self {
        if applications_dir.join(DESKTOP_ENTRY_NAME).exists() {
            return Self::default();
        }
        Self {
            token: Some(InstallToken {
                applications_dir,
                exe,
            }),
        }
    }

    pub fn is_available(&self) -> bool {
        self.token.is_some()
    }

    /// Consume the token and install. Returns None when the token was
    /// already spent or never available.
    pub fn accept(&mut self) -> Option<io::Result<()>> {
        self.token.take().map(InstallToken::install)
    }

    /// Consume the token without installing.
    pub fn dismiss(&mut self) {
        self.token = None;
    }
}
