// Configuração lida do ambiente (.env carregado via dotenv no main)

use crate::utils::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBackend {
    Firestore,
    MongoDB,
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub emulator_host: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: DocumentBackend,
    pub firestore: Option<FirestoreConfig>,
    pub database_url: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de lookup (facilita testes)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AppError::ConfigError(format!("PORT inválida: {}", p)))?,
            None => 8080,
        };

        let backend = match var("DOCUMENT_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("firestore") => DocumentBackend::Firestore,
            Some("mongodb") | Some("mongo") => DocumentBackend::MongoDB,
            Some(other) => {
                return Err(AppError::ConfigError(format!(
                    "DOCUMENT_BACKEND desconhecido: {}",
                    other
                )))
            }
        };

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(s.parse::<u64>().map_err(|_| {
                AppError::ConfigError(format!("HTTP_TIMEOUT_SECS inválido: {}", s))
            })?),
            None => Duration::from_secs(10),
        };

        let database_url = var("DATABASE_URL");

        let firestore = match backend {
            DocumentBackend::Firestore => {
                let project_id = var("GOOGLE_CLOUD_PROJECT")
                    .or_else(|| var("GCLOUD_PROJECT"))
                    .ok_or_else(|| {
                        AppError::ConfigError(
                            "GOOGLE_CLOUD_PROJECT must be set for the firestore backend".to_string(),
                        )
                    })?;

                Some(FirestoreConfig {
                    project_id,
                    database_id: var("FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
                    emulator_host: var("FIRESTORE_EMULATOR_HOST"),
                    access_token: var("GOOGLE_OAUTH_ACCESS_TOKEN"),
                })
            }
            DocumentBackend::MongoDB => {
                if database_url.is_none() {
                    return Err(AppError::ConfigError(
                        "DATABASE_URL must be set for the mongodb backend".to_string(),
                    ));
                }
                None
            }
        };

        Ok(Self {
            host,
            port,
            backend,
            firestore,
            database_url,
            http_timeout,
        })
    }
}
