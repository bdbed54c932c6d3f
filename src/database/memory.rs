use super::DocumentStore;
use crate::{models::DocumentSnapshot, utils::error::AppError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Store em memória para testes: conta leituras e pode simular falha do banco
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, serde_json::Value>>,
    failure: Option<String>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_document(self, path: &str, data: serde_json::Value) -> Self {
        self.documents.write().unwrap().insert(path.to_string(), data);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn documents(&self) -> HashMap<String, serde_json::Value> {
        self.documents.read().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<DocumentSnapshot, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(AppError::DatabaseError(message.clone()));
        }

        Ok(match self.documents.read().unwrap().get(path) {
            Some(data) => DocumentSnapshot::found(path, data.clone()),
            None => DocumentSnapshot::missing(path),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
