use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Service base URL is a non-empty http(s) URL
/// - Pool concurrency is at least 1
/// - Default quality is within 0-100
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Service validation
    if config.service.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "service.base_url cannot be empty".to_string(),
        ));
    }
    if !config.service.base_url.starts_with("http://")
        && !config.service.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(format!(
            "service.base_url must start with http:// or https://, got '{}'",
            config.service.base_url
        )));
    }

    // Pool validation
    if config.pool.concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "pool.concurrency cannot be 0".to_string(),
        ));
    }

    // Defaults validation
    if config.defaults.quality > 100 {
        return Err(ConfigError::ValidationError(format!(
            "defaults.quality must be 0-100, got {}",
            config.defaults.quality
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let mut config = Config::default();
        config.service.base_url = String::new();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_non_http_base_url_fails() {
        let mut config = Config::default();
        config.service.base_url = "ftp://convert.local".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.pool.concurrency = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_quality_out_of_range_fails() {
        let mut config = Config::default();
        config.defaults.quality = 101;
        assert!(validate_config(&config).is_err());
    }
}
