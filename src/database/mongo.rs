use super::{split_document_path, DocumentStore};
use crate::{models::DocumentSnapshot, utils::error::AppError};
use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database};
use std::time::Duration;

/// Backend MongoDB: uma coleção por caminho de coleções, `_id` = id do documento.
/// "usuarios/{uid}" vira a coleção "usuarios" com `_id: uid`;
/// subcoleções usam os ids unidos por ponto ("usuarios.checkins").
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Pool pequeno: uma leitura por evento
        client_options.max_pool_size = Some(10);
        client_options.min_pool_size = Some(1);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = database_name_from_uri(uri);
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;
        log::info!("📊 MongoDB database: {}", db_name);

        Ok(Self { db })
    }

    fn collection_for(&self, collections: &[&str]) -> Collection<Document> {
        self.db.collection(&collections.join("."))
    }
}

fn database_name_from_uri(uri: &str) -> &str {
    uri.split_once("://")
        .map_or(uri, |(_, rest)| rest)
        .split_once('/')
        .and_then(|(_, path)| path.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("fitlab")
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn get(&self, path: &str) -> Result<DocumentSnapshot, AppError> {
        let (collections, id) = split_document_path(path)?;

        let filter = if collections.len() == 1 {
            doc! { "_id": id }
        } else {
            doc! { "_id": path.trim_matches('/') }
        };

        let found = self.collection_for(&collections).find_one(filter).await?;

        Ok(match found {
            Some(document) => {
                DocumentSnapshot::found(path, Bson::Document(document).into_relaxed_extjson())
            }
            None => DocumentSnapshot::missing(path),
        })
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
