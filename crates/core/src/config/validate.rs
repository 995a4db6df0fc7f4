use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Listing page size and proxy timeout are positive
/// - Proxy referer and CORS origins are http(s) URLs
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.catalog.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.page_size cannot be 0".to_string(),
        ));
    }

    if config.proxy.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "proxy.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(referer) = &config.proxy.referer {
        if !is_http_url(referer) {
            return Err(ConfigError::ValidationError(format!(
                "proxy.referer must be an http(s) URL, got {:?}",
                referer
            )));
        }
    }

    for origin in &config.cors.allowed_origins {
        if !is_http_url(origin) {
            return Err(ConfigError::ValidationError(format!(
                "cors.allowed_origins entries must be http(s) origins, got {:?}",
                origin
            )));
        }
    }

    Ok(())
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_page_size_zero_fails() {
        let mut config = Config::default();
        config.catalog.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_timeout_zero_fails() {
        let mut config = Config::default();
        config.proxy.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_referer_fails() {
        let mut config = Config::default();
        config.proxy.referer = Some("example.org".to_string());
        assert!(validate_config(&config).is_err());

        config.proxy.referer = Some("https://example.org/".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_origin_fails() {
        let mut config = Config::default();
        config.cors.allowed_origins = vec!["localhost:5173".to_string()];
        assert!(validate_config(&config).is_err());
    }
}
