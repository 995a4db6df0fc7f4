use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix for overrides.
///
/// Sections and fields are separated by a double underscore so field names
/// keep their own underscores: `MANGASHELF_CATALOG__PAGE_SIZE=50`.
pub const ENV_PREFIX: &str = "MANGASHELF_";

/// Separator between a section and its field in override names.
pub const ENV_SEPARATOR: &str = "__";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[catalog]
page_size = 50
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.catalog.page_size, 50);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.catalog.page_size, 1000);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[server]
port = "eighty"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    // Tests that read the environment run inside a figment Jail, which
    // serializes them and restores the environment afterwards.

    #[test]
    fn test_load_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[server]
host = "127.0.0.1"
port = 3000

[proxy]
referer = "https://example.org/"
"#,
            )?;

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.server.host.to_string(), "127.0.0.1");
            assert_eq!(config.proxy.referer.as_deref(), Some("https://example.org/"));
            assert_eq!(config.proxy.timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_multi_word_fields() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[catalog]
page_size = 200
"#,
            )?;
            jail.set_env("MANGASHELF_CATALOG__PAGE_SIZE", "5");
            jail.set_env("MANGASHELF_PROXY__TIMEOUT_SECS", "7");
            jail.set_env("MANGASHELF_SERVER__PORT", "9001");

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.catalog.page_size, 5);
            assert_eq!(config.proxy.timeout_secs, 7);
            assert_eq!(config.server.port, 9001);
            Ok(())
        });
    }

    #[test]
    fn test_env_ignores_unrelated_prefixed_vars() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "")?;
            jail.set_env("MANGASHELF_CONFIG", "/somewhere/else.toml");

            let config = load_config(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.catalog.page_size, 1000);
            Ok(())
        });
    }
}
