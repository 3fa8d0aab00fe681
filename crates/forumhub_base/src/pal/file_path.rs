use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};

/// A path relative to the PAL's base directory, such as `forumhub.toml`.
///
/// ```
/// use forumhub_base::FilePath;
///
/// let config = FilePath::from("conf/forumhub.toml");
/// assert_eq!(config.to_string(), "conf/forumhub.toml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(RelativePathBuf);

impl FilePath {
    /// The relative portion as a std `Path`, without any base directory.
    pub fn as_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// Resolve against a base directory.
    pub fn resolve(&self, base_dir: &Path) -> PathBuf {
        self.0.to_path(base_dir)
    }
}

impl From<&str> for FilePath {
    fn from(s: &str) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl From<String> for FilePath {
    fn from(s: String) -> Self {
        Self(RelativePathBuf::from(s))
    }
}

impl std::fmt::Display for FilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
