use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path};

const DEFAULT_PORT: u16 = 53998;
const DEFAULT_SQLITE_PATH: &str = "notes.sdb";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: DatabaseConfig,
}

/// Storage backend the notes table lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Embedded file database
    Sqlite { path: String },
    /// Client-server database, addressed by a libpq style DSN
    Postgres { dsn: String },
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn parse_config(contents: &str) -> Result<Config, Box<dyn std::error::Error>> {
    serde_yaml::from_str(contents).map_err(Into::into)
}

fn config_from_vars<F>(var: F) -> Result<Config, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match var("PORT") {
        Some(port) => port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse PORT: {e}"))?,
        None => DEFAULT_PORT,
    };

    let database = match var("PG_DSN") {
        Some(dsn) => DatabaseConfig::Postgres { dsn },
        None => DatabaseConfig::Sqlite {
            path: var("SQLITE_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
        },
    };

    Ok(Config { port, database })
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("NOTES_SERVER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        let contents = fs::read_to_string(&config_path)?;
        return parse_config(&contents);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        let contents = fs::read_to_string("config.yaml")?;
        return parse_config(&contents);
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        let contents = fs::read_to_string("config.example.yaml")?;
        return parse_config(&contents);
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, loading configuration from environment variables"
    );
    config_from_vars(|key| env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    #[test]
    fn parses_sqlite_config() {
        let cfg = parse_config("port: 8080\ndatabase:\n  backend: sqlite\n  path: /tmp/notes.sdb\n")
            .unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.database,
            DatabaseConfig::Sqlite {
                path: "/tmp/notes.sdb".to_string()
            }
        );
    }

    #[test]
    fn parses_postgres_config_with_default_port() {
        let cfg = parse_config("database:\n  backend: postgres\n  dsn: host=db user=notes\n").unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(
            cfg.database,
            DatabaseConfig::Postgres {
                dsn: "host=db user=notes".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(parse_config("database:\n  backend: mysql\n  url: x\n").is_err());
    }

    #[test]
    fn example_config_is_valid() {
        let cfg = parse_config(include_str!("../config.example.yaml")).unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(matches!(cfg.database, DatabaseConfig::Sqlite { .. }));
    }

    #[test]
    fn env_defaults_to_sqlite() {
        let cfg = config_from_vars(|_| None).unwrap();

        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(
            cfg.database,
            DatabaseConfig::Sqlite {
                path: DEFAULT_SQLITE_PATH.to_string()
            }
        );
    }

    #[test]
    fn env_prefers_postgres_when_dsn_present() {
        let vars = HashMap::from([
            ("PORT", "8080"),
            ("PG_DSN", "host=localhost"),
            ("SQLITE_PATH", "ignored.sdb"),
        ]);

        let cfg = config_from_vars(|key| vars.get(key).map(ToString::to_string)).unwrap();

        assert_eq!(cfg.port, 8080);
        assert_eq!(
            cfg.database,
            DatabaseConfig::Postgres {
                dsn: "host=localhost".to_string()
            }
        );
    }

    #[test]
    fn env_rejects_bad_port() {
        let err = config_from_vars(|key| (key == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("PORT"));
    }
}
