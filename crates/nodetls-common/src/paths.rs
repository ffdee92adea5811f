use std::path::PathBuf;

/// Root data directory for nodetls on the controlling machine.
///
/// - Linux / macOS: `~/.nodetls/`
/// - Windows: `%LOCALAPPDATA%\nodetls\`
///
/// `NODETLS_DATA_DIR` overrides the platform default.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("NODETLS_DATA_DIR") {
        return PathBuf::from(dir);
    }

    #[cfg(windows)]
    {
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            return PathBuf::from(local).join("nodetls");
        }
    }

    #[cfg(not(windows))]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".nodetls");
        }
    }

    // Fallback
    PathBuf::from(".nodetls")
}

/// Default configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Join a file name onto a directory on the target node.
///
/// Target nodes are always POSIX hosts, so this never uses the
/// controller's path separator.
pub fn remote_join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}
