// ==================== FIRESTORE (REST) ====================
// Leitura pontual via documents.get da API REST v1
// 200 = documento existe, 404 = não existe, qualquer outro status = erro

use super::{split_document_path, DocumentStore};
use crate::{
    config::FirestoreConfig,
    models::{DocumentSnapshot, FirestoreDocument},
    utils::error::AppError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

enum TokenSource {
    /// Emulador aceita qualquer token; "owner" ignora as security rules
    Emulator,
    Static(String),
    Metadata(Mutex<Option<CachedToken>>),
}

pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    database_id: String,
    tokens: TokenSource,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let (base_url, tokens) = match (&config.emulator_host, &config.access_token) {
            (Some(host), _) => {
                log::info!("🧪 Using Firestore emulator at {}", host);
                (format!("http://{}", host), TokenSource::Emulator)
            }
            (None, Some(token)) => (FIRESTORE_API_BASE.to_string(), TokenSource::Static(token.clone())),
            (None, None) => (FIRESTORE_API_BASE.to_string(), TokenSource::Metadata(Mutex::new(None))),
        };

        Ok(Self {
            http,
            base_url,
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            tokens,
        })
    }

    pub fn document_url(&self, path: &str) -> Result<String, AppError> {
        // Valida que é caminho de documento (número par de segmentos)
        split_document_path(path)?;

        let encoded: Vec<String> = path
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        Ok(format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.base_url,
            urlencoding::encode(&self.project_id),
            self.database_id,
            encoded.join("/")
        ))
    }

    async fn bearer_token(&self) -> Result<String, AppError> {
        match &self.tokens {
            TokenSource::Emulator => Ok("owner".to_string()),
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata(cache) => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
                    return Ok(token.value.clone());
                }

                let token = self.fetch_metadata_token().await?;
                let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
                let value = token.access_token;
                *cached = Some(CachedToken {
                    value: value.clone(),
                    expires_at: Instant::now() + lifetime,
                });
                Ok(value)
            }
        }
    }

    async fn fetch_metadata_token(&self) -> Result<MetadataToken, AppError> {
        log::debug!("🔑 Fetching access token from metadata server");

        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch access token: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DatabaseError(format!(
                "Metadata server error: {}",
                response.status()
            )));
        }

        response
            .json::<MetadataToken>()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to parse access token: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, path: &str) -> Result<DocumentSnapshot, AppError> {
        let url = self.document_url(path)?;
        let token = self.bearer_token().await?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to read {}: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot::missing(path));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::DatabaseError(format!(
                "Firestore returned {} for {}: {}",
                status, path, body
            )));
        }

        let document: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to parse {}: {}", path, e)))?;

        let mut snapshot = document.into_snapshot();
        snapshot.path = path.trim_matches('/').to_string();
        Ok(snapshot)
    }

    fn backend_name(&self) -> &'static str {
        match self.tokens {
            TokenSource::Emulator => "firestore-emulator",
            _ => "firestore",
        }
    }
}
