//! Layered server configuration.
//!
//! Sources, lowest priority first: built-in defaults, the YAML file given
//! with `--config`, `POSTBOARD__*` environment variables (`__` separates
//! nesting levels), then CLI flags.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use posts::PostsConfig;
use serde::{Deserialize, Serialize};
use svckit::{DatabaseConfig, LoggingConfig, ServicesConfig};
use tags::TagsConfig;
use thiserror::Error;

pub const ENV_PREFIX: &str = "POSTBOARD__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[source] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Shared by every module that has no `database` of its own.
    pub database: DatabaseConfig,
    pub services: ServicesConfig,
    pub modules: ModulesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8087)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModulesConfig {
    pub posts: PostsConfig,
    pub tags: TagsConfig,
}

impl AppConfig {
    /// Merge every source below the CLI.
    ///
    /// # Errors
    /// [`ConfigError::MissingFile`] when `path` is given but absent, or
    /// [`ConfigError::Invalid`] when the merged sources don't deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// `--port` replaces the listener port; each `-v` raises the log level
    /// one step from `info`.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) {
        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
        }
        match verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// Database a module should use: its own section, or the shared one.
    #[must_use]
    pub fn database_for<'a>(&'a self, own: Option<&'a DatabaseConfig>) -> &'a DatabaseConfig {
        own.unwrap_or(&self.database)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn defaults_without_any_source() {
        figment::Jail::expect_with(|_| {
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg, AppConfig::default());
            assert!(cfg.modules.posts.enabled);
            assert!(cfg.modules.tags.enabled);
            Ok(())
        });
    }

    #[test]
    fn yaml_overrides_only_what_it_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  bind_addr: \"0.0.0.0:9000\"\nservices:\n  base_url: \"http://users.internal\"\n  timeout: 2s\nmodules:\n  tags:\n    enabled: false\n    database:\n      dsn: \"sqlite::memory:\""
        )
        .unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(cfg.server.bind_addr.port(), 9000);
        assert_eq!(cfg.services.timeout, Duration::from_secs(2));
        assert!(!cfg.modules.tags.enabled);
        assert_eq!(
            cfg.database_for(cfg.modules.tags.database.as_ref()).dsn,
            "sqlite::memory:"
        );
        assert_eq!(
            cfg.database_for(cfg.modules.posts.database.as_ref()),
            &DatabaseConfig::default()
        );
        assert_eq!(cfg.logging, LoggingConfig::default());
    }

    #[test]
    fn environment_beats_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("postboard.yaml", "logging:\n  level: warn\n")?;
            jail.set_env("POSTBOARD__LOGGING__LEVEL", "debug");
            jail.set_env("POSTBOARD__DATABASE__DSN", "postgres://u:p@db/postboard");

            let cfg = AppConfig::load(Some(Path::new("postboard.yaml"))).unwrap();

            assert_eq!(cfg.logging.level, "debug");
            assert_eq!(cfg.database.dsn, "postgres://u:p@db/postboard");
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "srever:\n  bind_addr: \"0.0.0.0:9000\"").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn cli_overrides_port_and_verbosity() {
        let mut cfg = AppConfig::default();

        cfg.apply_cli_overrides(Some(9999), 2);

        assert_eq!(cfg.server.bind_addr.port(), 9999);
        assert_eq!(cfg.logging.level, "debug");
    }
}
