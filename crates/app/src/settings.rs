//! Handles settings for the application. Configuration is written in
//! `settings.toml` and any key can be overridden from the environment with
//! the `ESTIMATION` prefix, e.g. `ESTIMATION_SERVER__PORT=8080`.
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use engine::ClassifierSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Where the estimation data lives.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Postgres(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
            Database::Postgres(url) => url.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings"))
                .add_source(
                    Environment::with_prefix("ESTIMATION")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;
    use engine::{Action, ErrorKind};

    use super::*;

    fn parse(raw: &str) -> Result<Settings, ConfigError> {
        Settings::from_config(Config::builder().add_source(File::from_str(raw, FileFormat::Toml)))
    }

    #[test]
    fn minimal_settings_use_defaults() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.database, Database::Memory);
        assert_eq!(settings.server.database.url(), "sqlite::memory:");
        assert!(!settings.classifier.unclassified_delete_as_conflict);
        assert!(settings.classifier.constraints.is_empty());
    }

    #[test]
    fn sqlite_and_classifier_rules() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080
            database = { sqlite = "estimation.db" }

            [classifier]
            unclassified_delete_as_conflict = true

            [[classifier.constraints]]
            constraint = "costs_baseline_id_fkey"
            actions = ["delete"]
            kind = "conflict"
            message = "baseline {id} still has costs"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.database.url(), "sqlite:estimation.db?mode=rwc");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert!(settings.classifier.unclassified_delete_as_conflict);
        let rule = &settings.classifier.constraints[0];
        assert_eq!(rule.actions, vec![Action::Delete]);
        assert_eq!(rule.kind, ErrorKind::Conflict);
    }

    #[test]
    fn postgres_url_is_passed_through() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = { postgres = "postgres://estimation@localhost/estimation" }
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.server.database.url(),
            "postgres://estimation@localhost/estimation"
        );
    }

    #[test]
    fn missing_port_is_an_error() {
        let result = parse(
            r#"
            [server]
            database = "memory"
            "#,
        );
        assert!(result.is_err());
    }
}
