// ==================== FIRESTORE CLOUDEVENTS ====================
// Eventos de alteração de documento entregues via HTTP (Eventarc)
// Modo binário: atributos nos headers ce-*, corpo = DocumentEventData em JSON
// Modo estruturado: application/cloudevents+json com os atributos no corpo

use crate::models::document::{Change, DocumentSnapshot, FirestoreDocument};
use crate::utils::path_template::PathParams;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const FIRESTORE_EVENT_PREFIX: &str = "google.cloud.firestore.document.v1.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirestoreEventType {
    Written,
    Created,
    Updated,
    Deleted,
}

impl FirestoreEventType {
    /// Aceita também as variantes ".withAuthContext"
    pub fn parse(ce_type: &str) -> Option<Self> {
        let kind = ce_type.strip_prefix(FIRESTORE_EVENT_PREFIX)?;
        let kind = kind.strip_suffix(".withAuthContext").unwrap_or(kind);
        match kind {
            "written" => Some(Self::Written),
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventData {
    pub value: Option<FirestoreDocument>,
    pub old_value: Option<FirestoreDocument>,
}

impl DocumentEventData {
    pub fn into_change(self, path: &str) -> Change {
        let snapshot = |doc: Option<FirestoreDocument>| match doc {
            Some(doc) => doc.into_snapshot(),
            None => DocumentSnapshot::missing(path),
        };

        Change {
            before: snapshot(self.old_value),
            after: snapshot(self.value),
        }
    }
}

/// CloudEvent já normalizado (modo binário ou estruturado)
#[derive(Debug, Clone, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub subject: Option<String>,
    pub time: Option<DateTime<Utc>>,
    /// Extensão do Firestore com o caminho relativo do documento
    pub document: Option<String>,
    #[serde(default)]
    pub data: Option<DocumentEventData>,
}

impl CloudEvent {
    /// Caminho relativo do documento alterado:
    /// extensão "document" (já relativa) > subject ("documents/...") > nome do documento no payload
    pub fn document_path(&self) -> Option<String> {
        if let Some(document) = self.document.as_deref().filter(|d| !d.is_empty()) {
            return Some(document.trim_matches('/').to_string());
        }

        if let Some(subject) = self.subject.as_deref().filter(|s| !s.is_empty()) {
            let subject = subject.trim_matches('/');
            return Some(subject.strip_prefix("documents/").unwrap_or(subject).to_string());
        }

        let data = self.data.as_ref()?;
        data.value
            .as_ref()
            .or(data.old_value.as_ref())
            .map(|doc| doc.relative_path().to_string())
    }
}

/// Contexto passado ao handler: identificação do evento e parâmetros do caminho
#[derive(Debug, Clone)]
pub struct EventContext {
    pub event_id: String,
    pub event_type: FirestoreEventType,
    pub source: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub params: PathParams,
}

impl EventContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(
            FirestoreEventType::parse("google.cloud.firestore.document.v1.written"),
            Some(FirestoreEventType::Written)
        );
        assert_eq!(
            FirestoreEventType::parse("google.cloud.firestore.document.v1.deleted.withAuthContext"),
            Some(FirestoreEventType::Deleted)
        );
        assert_eq!(FirestoreEventType::parse("google.cloud.pubsub.topic.v1.messagePublished"), None);
        assert_eq!(FirestoreEventType::parse("google.cloud.firestore.document.v1.archived"), None);
    }

    #[test]
    fn test_document_path_precedence() {
        let event: CloudEvent = serde_json::from_value(json!({
            "specversion": "1.0",
            "id": "evt-1",
            "source": "//firestore.googleapis.com/projects/fitlab/databases/(default)",
            "type": "google.cloud.firestore.document.v1.written",
            "subject": "documents/usuarios/from-subject/checkins/c1",
            "document": "usuarios/from-extension/checkins/c1"
        }))
        .unwrap();
        assert_eq!(event.document_path().as_deref(), Some("usuarios/from-extension/checkins/c1"));

        let event: CloudEvent = serde_json::from_value(json!({
            "id": "evt-2",
            "type": "google.cloud.firestore.document.v1.deleted",
            "data": {
                "oldValue": {
                    "name": "projects/fitlab/databases/(default)/documents/usuarios/u9/checkins/c9",
                    "fields": {}
                }
            }
        }))
        .unwrap();
        assert_eq!(event.document_path().as_deref(), Some("usuarios/u9/checkins/c9"));
    }

    #[test]
    fn test_delete_payload_into_change() {
        let data: DocumentEventData = serde_json::from_value(json!({
            "oldValue": {
                "name": "projects/fitlab/databases/(default)/documents/usuarios/u1/checkins/c1",
                "fields": { "pontos": { "integerValue": "10" } }
            }
        }))
        .unwrap();

        let change = data.into_change("usuarios/u1/checkins/c1");
        assert!(change.before.exists());
        assert!(!change.after.exists());
        assert_eq!(change.after.path, "usuarios/u1/checkins/c1");
    }
}
