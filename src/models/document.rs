use crate::utils::path_template::resource_name_to_path;
use serde::Deserialize;

/// Leitura pontual de um documento, com flag de existência
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub path: String,
    pub data: Option<serde_json::Value>,
}

impl DocumentSnapshot {
    pub fn found(path: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            path: path.into(),
            data: Some(data),
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

/// Par antes/depois do documento alterado
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub before: DocumentSnapshot,
    pub after: DocumentSnapshot,
}

impl Change {
    pub fn kind(&self) -> Option<ChangeKind> {
        match (self.before.exists(), self.after.exists()) {
            (false, true) => Some(ChangeKind::Create),
            (true, true) => Some(ChangeKind::Update),
            (true, false) => Some(ChangeKind::Delete),
            (false, false) => None,
        }
    }
}

/// Documento no formato JSON da API REST / Eventarc do Firestore.
/// createTime/updateTime são ignorados.
#[derive(Debug, Clone, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl FirestoreDocument {
    pub fn relative_path(&self) -> &str {
        resource_name_to_path(&self.name)
    }

    pub fn into_snapshot(self) -> DocumentSnapshot {
        let path = self.relative_path().to_string();
        DocumentSnapshot::found(path, serde_json::Value::Object(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_kind() {
        let path = "usuarios/u1/checkins/c1";
        let present = DocumentSnapshot::found(path, json!({ "academia": "centro" }));
        let absent = DocumentSnapshot::missing(path);

        let create = Change { before: absent.clone(), after: present.clone() };
        let update = Change { before: present.clone(), after: present.clone() };
        let delete = Change { before: present, after: absent.clone() };
        let empty = Change { before: absent.clone(), after: absent };

        assert_eq!(create.kind(), Some(ChangeKind::Create));
        assert_eq!(update.kind(), Some(ChangeKind::Update));
        assert_eq!(delete.kind(), Some(ChangeKind::Delete));
        assert_eq!(empty.kind(), None);
    }

    #[test]
    fn test_firestore_document_into_snapshot() {
        let doc: FirestoreDocument = serde_json::from_value(json!({
            "name": "projects/fitlab/databases/(default)/documents/usuarios/u1",
            "fields": { "nome": { "stringValue": "Ana" } },
            "createTime": "2024-05-01T10:00:00.000000Z",
            "updateTime": "2024-05-01T10:00:00.000000Z"
        }))
        .unwrap();

        let snap = doc.into_snapshot();
        assert!(snap.exists());
        assert_eq!(snap.path, "usuarios/u1");
        assert_eq!(snap.data.unwrap()["nome"]["stringValue"], "Ana");
    }
}
