// Acesso ao banco de documentos: só leitura pontual por caminho

pub mod firestore;
pub mod mongo;
#[cfg(test)]
pub mod memory;

use crate::{
    config::{Config, DocumentBackend},
    models::DocumentSnapshot,
    utils::error::AppError,
};
use async_trait::async_trait;
use std::sync::Arc;

pub use self::firestore::FirestoreStore;
pub use self::mongo::MongoStore;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lê o documento no caminho relativo (ex: "usuarios/abc123")
    async fn get(&self, path: &str) -> Result<DocumentSnapshot, AppError>;

    fn backend_name(&self) -> &'static str;
}

/// Inicialização única do cliente, feita no startup antes de registrar o endpoint
pub async fn connect(config: &Config) -> Result<Arc<dyn DocumentStore>, AppError> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        DocumentBackend::Firestore => {
            let firestore = config.firestore.as_ref().ok_or_else(|| {
                AppError::ConfigError("missing firestore configuration".to_string())
            })?;
            Arc::new(FirestoreStore::new(firestore, config.http_timeout)?)
        }
        DocumentBackend::MongoDB => {
            let uri = config.database_url.as_deref().ok_or_else(|| {
                AppError::ConfigError("DATABASE_URL must be set".to_string())
            })?;
            Arc::new(MongoStore::new(uri).await?)
        }
    };

    log::info!("✅ Document store ready ({})", store.backend_name());
    Ok(store)
}

/// Divide "colecao/doc/subcolecao/doc" em (ids de coleção, id do documento)
pub(crate) fn split_document_path(path: &str) -> Result<(Vec<&str>, &str), AppError> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    if parts.len() % 2 != 0 || parts.iter().any(|p| p.is_empty()) {
        return Err(AppError::DatabaseError(format!(
            "'{}' is not a document path",
            path
        )));
    }

    let collections = parts.iter().step_by(2).copied().collect();
    Ok((collections, parts[parts.len() - 1]))
}
