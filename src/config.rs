use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_FILE: &str = ".storefront/session.json";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Environnement correspondant à la valeur de APP_ENV
    fn from_app_env(value: Option<&str>) -> Self {
        match value {
            Some("production") | Some("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Paramètres du client storefront
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub timeout: Duration,
    pub revalidate_on_startup: bool,
}

impl ClientConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Même chose que [`from_env`](Self::from_env) avec une source de variables injectée
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_app_env(lookup("APP_ENV").as_deref());
        tracing::debug!(
            "🌍 Environment detected: {}",
            environment.as_str().to_uppercase()
        );

        let api_base_url = Self::get_api_url(environment, &lookup)?;
        let session_file = lookup("STOREFRONT_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        let timeout_ms = match lookup("STOREFRONT_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("STOREFRONT_TIMEOUT_MS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let revalidate_on_startup = lookup("STOREFRONT_REVALIDATE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        tracing::debug!("   API: {}", Self::mask_credentials(&api_base_url));
        tracing::debug!("   Session file: {}", session_file.display());

        Ok(Self {
            environment,
            api_base_url,
            session_file,
            timeout: Duration::from_millis(timeout_ms),
            revalidate_on_startup,
        })
    }

    /// Récupère l'URL de l'API, obligatoire en production
    fn get_api_url<F>(environment: Environment, lookup: &F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("STOREFRONT_API_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => Ok(url.trim().trim_end_matches('/').to_string()),
            None if environment.is_production() => {
                tracing::error!("❌ STOREFRONT_API_URL not set in production!");
                anyhow::bail!("STOREFRONT_API_URL is required in production");
            }
            None => {
                tracing::debug!("STOREFRONT_API_URL not set, using {DEFAULT_API_URL}");
                Ok(DEFAULT_API_URL.to_string())
            }
        }
    }

    /// Masque les credentials dans les logs
    pub fn mask_credentials(url: &str) -> String {
        if let Some(at_pos) = url.find('@')
            && let Some(scheme_end) = url.find("://")
            && at_pos > scheme_end
        {
            let scheme = &url[..scheme_end + 3];
            let after_at = &url[at_pos..];
            return format!("{}***:***{}", scheme, after_at);
        }
        url.to_string()
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}
