use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("PIXFERRY_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[service]
base_url = "http://convert.local:8080"

[pool]
concurrency = 8
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.service.base_url, "http://convert.local:8080");
        assert_eq!(config.pool.concurrency, 8);
        assert_eq!(config.download.pace_ms, 150);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.defaults.format, "webp");
        assert_eq!(config.pool.concurrency, 4);
    }

    #[test]
    fn test_load_config_from_str_invalid() {
        let result = load_config_from_str("[service\nbase_url = 3");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[service]
base_url = "http://127.0.0.1:9000"
timeout_secs = 30

[defaults]
format = "avif"
quality = 65
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.defaults.format, "avif");
        assert_eq!(config.defaults.quality, 65);
    }
}
