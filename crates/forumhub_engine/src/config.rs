use forumhub_base::pal::http::HttpServerConfig;
use forumhub_base::{FilePath, ForumError, ForumResult, PalHandle, ResultExt};
use serde::Deserialize;
use tracing::info;

/// Server configuration, read from `forumhub.toml`.
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on; 0 lets the OS pick one.
    pub port: u16,
    /// Sent in the `Server` response header.
    pub server_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            server_name: "forumhub".to_string(),
        }
    }
}

impl Config {
    pub fn http_server_config(&self) -> HttpServerConfig {
        HttpServerConfig::new(self.host.clone())
            .with_port(self.port)
            .with_server_name(self.server_name.clone())
    }
}

/// Load the config at `path`, falling back to defaults if the file does not exist.
pub fn load_config(pal: &PalHandle, path: &FilePath) -> ForumResult<Config> {
    if !pal.file_exists(path)? {
        info!(path = %path, "No config file found, using defaults");
        return Ok(Config::default());
    }
    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("Failed to read config {}", path))?;
    toml::from_str(&text).map_err(|e| {
        Box::new(
            ForumError::message(e.to_string()).context(format!("Failed to parse config {}", path)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forumhub_base::MockPal;

    fn pal_with_config(content: &str) -> PalHandle {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("forumhub.toml"), content.as_bytes().to_vec());
        PalHandle::new(mock)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let pal = PalHandle::new(MockPal::new());
        let config = load_config(&pal, &FilePath::from("forumhub.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http_server_config().address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let pal = pal_with_config("port = 9191\n");
        let config = load_config(&pal, &FilePath::from("forumhub.toml")).unwrap();
        assert_eq!(config.port, 9191);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.server_name, "forumhub");
    }

    #[test]
    fn test_full_file() {
        let pal = pal_with_config(
            "host = \"0.0.0.0\"\nport = 80\nserver_name = \"forum-prod\"\n",
        );
        let config = load_config(&pal, &FilePath::from("forumhub.toml")).unwrap();
        let http = config.http_server_config();
        assert_eq!(http.address(), "0.0.0.0:80");
        assert_eq!(http.server_name, "forum-prod");
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let pal = pal_with_config("port = \"not a number\"\n");
        let err = load_config(&pal, &FilePath::from("forumhub.toml")).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Failed to parse config forumhub.toml: ")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let pal = pal_with_config("prot = 8080\n");
        assert!(load_config(&pal, &FilePath::from("forumhub.toml")).is_err());
    }
}
