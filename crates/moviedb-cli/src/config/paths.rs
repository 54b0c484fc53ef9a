//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application directory under the user config root.
const APP_DIR: &str = "moviedb";

/// Resolves the config file path.
///
/// Precedence: `{dir}/config.toml`, then `$XDG_CONFIG_HOME/moviedb/config.toml`,
/// then `~/.config/moviedb/config.toml`.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    config_path_from(dir.map(PathBuf::as_path), xdg.as_deref(), home.as_deref())
}

fn config_path_from(dir: Option<&Path>, xdg: Option<&Path>, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    if let Some(x) = xdg.filter(|p| p.is_absolute()) {
        return Ok(x.join(APP_DIR).join(CONFIG_FILE));
    }
    if let Some(h) = home {
        return Ok(h.join(".config").join(APP_DIR).join(CONFIG_FILE));
    }
    bail!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_dir_wins() {
        // Arrange
        let dir = Path::new("/tmp/moviedb-test");

        // Act
        let path = config_path_from(Some(dir), Some(Path::new("/xdg")), Some(Path::new("/home/u")))
            .unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/moviedb-test/config.toml"));
    }

    #[test]
    fn test_xdg_before_home() {
        // Arrange & Act
        let path = config_path_from(None, Some(Path::new("/xdg")), Some(Path::new("/home/u")))
            .unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/xdg/moviedb/config.toml"));
    }

    #[test]
    fn test_relative_xdg_is_ignored() {
        // Arrange & Act
        let path =
            config_path_from(None, Some(Path::new("rel")), Some(Path::new("/home/u"))).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/home/u/.config/moviedb/config.toml"));
    }

    #[test]
    fn test_no_location_is_error() {
        // Arrange & Act
        let result = config_path_from(None, None, None);

        // Assert
        assert!(result.is_err());
    }
}
