//! Chrome/Chromium acquisition and the chromiumoxide-backed [`Session`].
//!
//! [`Session`]: crate::session::Session

mod chrome;

pub use chrome::{ChromeElement, ChromeSession};

use std::path::{Path, PathBuf};

use crate::config::BrowserOptions;
use crate::error::{CrawlError, Result};

/// Executables looked up on `PATH`, in order of preference.
const CHROME_BINARIES: [&str; 4] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Well-known install locations tried when nothing is on `PATH`.
const CHROME_CANDIDATES: [&str; 9] = [
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // NixOS
    "/run/current-system/sw/bin/google-chrome",
    "/run/current-system/sw/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Find a Chrome/Chromium executable on this machine.
pub fn find_chrome() -> Option<PathBuf> {
    locate_chrome(which, |path| path.exists())
}

/// The executable to launch: the configured path if any, otherwise whatever
/// [`find_chrome`] turns up.
pub fn resolve_chrome(options: &BrowserOptions) -> Result<PathBuf> {
    match &options.chrome_path {
        Some(path) => Ok(path.clone()),
        None => find_chrome().ok_or(CrawlError::ChromeNotFound),
    }
}

fn locate_chrome(
    which: impl Fn(&str) -> Option<PathBuf>,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    CHROME_BINARIES
        .iter()
        .find_map(|binary| which(binary))
        .or_else(|| {
            CHROME_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .find(|candidate| exists(candidate))
        })
}

fn which(binary: &str) -> Option<PathBuf> {
    let output = std::process::Command::new("which").arg(binary).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_chrome_prefers_path_lookup() {
        let found = locate_chrome(
            |binary| (binary == "chromium").then(|| PathBuf::from("/opt/bin/chromium")),
            |_| true,
        );
        assert_eq!(found, Some(PathBuf::from("/opt/bin/chromium")));
    }

    #[test]
    fn test_locate_chrome_uses_first_path_hit() {
        let found = locate_chrome(
            |binary| Some(PathBuf::from(format!("/bin/{binary}"))),
            |_| false,
        );
        assert_eq!(found, Some(PathBuf::from("/bin/google-chrome")));
    }

    #[test]
    fn test_locate_chrome_falls_back_to_known_paths() {
        let found = locate_chrome(|_| None, |path| path == Path::new("/snap/bin/chromium"));
        assert_eq!(found, Some(PathBuf::from("/snap/bin/chromium")));
    }

    #[test]
    fn test_locate_chrome_none() {
        assert_eq!(locate_chrome(|_| None, |_| false), None);
    }

    #[test]
    fn test_resolve_chrome_explicit_path_wins() {
        let options = BrowserOptions {
            chrome_path: Some(PathBuf::from("/custom/chrome")),
            ..BrowserOptions::default()
        };
        assert_eq!(resolve_chrome(&options).unwrap(), PathBuf::from("/custom/chrome"));
    }
}
