use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub pool_size: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    /// Shared by the weather endpoints and the credentialed geocoder
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocodingConfig {
    pub nominatim_url: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    pub json: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub weather: WeatherConfig,
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to the DuckDB database file
    #[arg(long, value_name = "FILE")]
    pub database: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

const ENV_PREFIX: &str = "WEATHER_LEDGER";
const API_KEY_VAR: &str = "OWM_API_KEY";

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Defaults first, everything else layers on top
        let mut config_builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/weather-ledger/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;
        config.apply_args(args);

        if config.weather.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_VAR) {
                config.weather.api_key = key;
            }
        }

        Ok(config)
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.web.host = host.clone();
        }
        if let Some(port) = args.port {
            self.web.port = port;
        }
        if let Some(database) = &args.database {
            self.database.connection_string = database.clone();
        }
        if args.log_json {
            self.logging.json = true;
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: "weather.db".to_string(),
                pool_size: 5,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            weather: WeatherConfig {
                api_key: String::new(),
                api_base_url: "https://api.openweathermap.org".to_string(),
                timeout_secs: 10,
            },
            geocoding: GeocodingConfig {
                nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
                user_agent: "weather_app".to_string(),
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
[web]
port = 8080

[weather]
api_key = "FILE_KEY"
timeout_secs = 3
"#,
        );
        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let config = AppConfig::new(&args).unwrap();

        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.weather.api_key, "FILE_KEY");
        assert_eq!(config.weather.timeout_secs, 3);
        assert_eq!(config.database.connection_string, "weather.db");
        assert_eq!(config.geocoding.user_agent, "weather_app");
    }

    #[test]
    fn cli_args_override_file() {
        let file = write_config("[web]\nhost = \"0.0.0.0\"\nport = 8080\n");
        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(9000),
            database: Some("/tmp/other.db".to_string()),
            log_json: true,
            ..Default::default()
        };

        let config = AppConfig::new(&args).unwrap();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.database.connection_string, "/tmp/other.db");
        assert!(config.logging.json);
    }

    #[test]
    fn oversized_pool_is_rejected() {
        let file = write_config("[database]\npool_size = 5000000000\n");
        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        assert!(AppConfig::new(&args).is_err());

        let file = write_config("[database]\npool_size = 3\n");
        let args = CliArgs {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(AppConfig::new(&args).unwrap().database.pool_size, 3);
    }
}
