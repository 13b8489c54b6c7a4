//! Adapters from config to the API-backed repositories

use crewdash_infra::ApiClient;
use crewdash_types::Result;

use crate::config::Config;

/// Open the API client described by `config`
pub fn open_api_client(config: &Config) -> Result<ApiClient> {
    open_api_client_at(&config.api_base_url, config)
}

/// Open an API client at an explicit base URL, keeping the config timeout
pub fn open_api_client_at(base_url: &str, config: &Config) -> Result<ApiClient> {
    ApiClient::new(base_url, config.request_timeout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_uses_config_url() {
        let config = Config {
            api_base_url: "http://10.0.0.5:8080/".to_string(),
            ..Config::default()
        };
        let client = open_api_client(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.5:8080");
    }

    #[test]
    fn test_open_rejects_bad_override() {
        assert!(open_api_client_at("localhost:5000", &Config::default()).is_err());
    }
}
