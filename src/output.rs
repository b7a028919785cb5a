//! Output directory helpers: revealing the finished reports in the platform
//! file manager.

use std::io;
use std::path::Path;
use std::process::Command;

/// File manager launcher for the current platform
pub fn file_manager() -> Option<&'static str> {
    file_manager_for(std::env::consts::OS)
}

fn file_manager_for(os: &str) -> Option<&'static str> {
    match os {
        "windows" => Some("explorer"),
        "macos" => Some("open"),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Some("xdg-open"),
        _ => None,
    }
}

/// Open `dir` in the platform file manager
pub fn reveal(dir: &Path) -> io::Result<()> {
    let program = file_manager().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot open folders on {}", std::env::consts::OS),
        )
    })?;

    let status = Command::new(program).arg(dir).status()?;
    // explorer.exe reports failure even when the window opened
    if !status.success() && program != "explorer" {
        return Err(io::Error::other(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms_have_launchers() {
        assert_eq!(file_manager_for("windows"), Some("explorer"));
        assert_eq!(file_manager_for("macos"), Some("open"));
        assert_eq!(file_manager_for("linux"), Some("xdg-open"));
        assert_eq!(file_manager_for("haiku"), None);
    }
}
