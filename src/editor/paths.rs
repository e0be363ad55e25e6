//! Editor configuration location per operating system.

use crate::error::{McpHubError, McpHubResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    MacOs,
    Windows,
    Linux,
}

impl Os {
    /// The OS this binary runs on.
    pub fn current() -> McpHubResult<Self> {
        Self::from_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value.
    pub fn from_name(name: &str) -> McpHubResult<Self> {
        match name {
            "macos" => Ok(Os::MacOs),
            "windows" => Ok(Os::Windows),
            "linux" => Ok(Os::Linux),
            other => Err(McpHubError::Unsupported {
                os: other.to_string(),
            }),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Os::MacOs => "macOS",
            Os::Windows => "Windows",
            Os::Linux => "Linux",
        }
    }
}

/// VS Code's user-level `mcp.json` under `home`.
pub fn editor_config_path(os: Os, home: &Path) -> PathBuf {
    let user_dir = match os {
        Os::MacOs => home.join("Library").join("Application Support"),
        Os::Windows => home.join("AppData").join("Roaming"),
        Os::Linux => home.join(".config"),
    };
    user_dir.join("Code").join("User").join("mcp.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_path_per_os() {
        let home = Path::new("/home/ada");
        assert_eq!(
            editor_config_path(Os::Linux, home),
            PathBuf::from("/home/ada/.config/Code/User/mcp.json")
        );
        assert_eq!(
            editor_config_path(Os::MacOs, home),
            PathBuf::from("/home/ada/Library/Application Support/Code/User/mcp.json")
        );
        assert_eq!(
            editor_config_path(Os::Windows, home),
            home.join("AppData").join("Roaming").join("Code").join("User").join("mcp.json")
        );
    }

    #[test]
    fn unknown_os_is_unsupported() {
        assert_eq!(Os::from_name("linux").unwrap(), Os::Linux);
        assert!(matches!(
            Os::from_name("freebsd"),
            Err(McpHubError::Unsupported { .. })
        ));
    }
}
