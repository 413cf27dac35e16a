use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SHELFCHECK_ENV";
const CONFIG_DIR_ENV: &str = "SHELFCHECK_CONFIG_DIR";
const ENV_PREFIX: &str = "SHELFCHECK";

/// Placeholder substituted with the encoded title in the catalog search template.
pub const SEARCH_TERM_PLACEHOLDER: &str = "{SEARCH_TERM}";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub client: ClientSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from `config_dir` for the named environment.
    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    /// Inbound request timeout. Unset means requests run until the catalog answers.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: None,
        }
    }
}

/// Where and how the external library catalog is scraped.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// Search page URL containing the `{SEARCH_TERM}` placeholder.
    #[serde(default = "CatalogSettings::default_search_url_template")]
    pub search_url_template: String,
    /// CSS selector for the availability marker of the top result.
    #[serde(default = "CatalogSettings::default_availability_selector")]
    pub availability_selector: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl CatalogSettings {
    fn default_search_url_template() -> String {
        "https://sccl.bibliocommons.com/v2/search?query={SEARCH_TERM}&searchType=keyword&f_FORMAT=EBOOK%7CBK&f_STATUS=LA%7C_online_".to_string()
    }

    fn default_availability_selector() -> String {
        r#"[data-key="availability-status-available"]"#.to_string()
    }

    /// Check the template carries the search placeholder.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.search_url_template.contains(SEARCH_TERM_PLACEHOLDER) {
            return Err(anyhow!(
                "catalog.search_url_template must contain {}",
                SEARCH_TERM_PLACEHOLDER
            ));
        }
        if self.availability_selector.trim().is_empty() {
            return Err(anyhow!("catalog.availability_selector must not be empty"));
        }
        Ok(())
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            search_url_template: Self::default_search_url_template(),
            availability_selector: Self::default_availability_selector(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_filter")]
    pub log_filter: String,
}

impl TelemetrySettings {
    fn default_log_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: Self::default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings for the command-line form client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "ClientSettings::default_endpoint")]
    pub endpoint: String,
}

impl ClientSettings {
    fn default_endpoint() -> String {
        "http://127.0.0.1:8080".to_string()
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
        }
    }
}
