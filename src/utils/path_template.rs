// Templates de caminho de documento no formato "usuarios/{uid}/checkins/{checkinId}"
// Usados pelo binding do trigger para casar o documento alterado e extrair os parâmetros

use crate::utils::error::AppError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// Parâmetros extraídos do caminho (ex: uid, checkinId)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(AppError::ConfigError("empty path template".to_string()));
        }

        let mut segments = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(AppError::ConfigError(format!(
                    "empty segment in path template '{}'",
                    raw
                )));
            }

            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                Some(_) => {
                    return Err(AppError::ConfigError(format!(
                        "unnamed parameter in path template '{}'",
                        raw
                    )))
                }
                None => Segment::Literal(part.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Casa um caminho relativo de documento contra o template.
    /// Retorna None se a profundidade ou algum literal não bater.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            if part.is_empty() {
                return None;
            }
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.as_str(), part),
            }
        }

        Some(params)
    }
}

/// "projects/{p}/databases/{d}/documents/{caminho}" -> "{caminho}".
/// Nomes fora desse formato são devolvidos sem alteração (só sem barras nas pontas).
pub fn resource_name_to_path(name: &str) -> &str {
    let trimmed = name.trim_matches('/');
    let mut parts = trimmed.splitn(6, '/');
    match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some("projects"), Some(_), Some("databases"), Some(_), Some("documents"), Some(path)) => path,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkins() -> PathTemplate {
        PathTemplate::parse("usuarios/{uid}/checkins/{checkinId}").unwrap()
    }

    #[test]
    fn test_matches_checkin_path() {
        let params = checkins().matches("usuarios/abc123/checkins/c-1").unwrap();
        assert_eq!(params.get("uid"), Some("abc123"));
        assert_eq!(params.get("checkinId"), Some("c-1"));
    }

    #[test]
    fn test_rejects_other_shapes() {
        let template = checkins();
        assert!(template.matches("usuarios/abc123").is_none());
        assert!(template.matches("usuarios/abc123/treinos/c-1").is_none());
        assert!(template.matches("usuarios/abc123/checkins/c-1/fotos/f1").is_none());
        assert!(template.matches("usuarios//checkins/c-1").is_none());
    }

    #[test]
    fn test_invalid_templates() {
        assert!(PathTemplate::parse("").is_err());
        assert!(PathTemplate::parse("usuarios//checkins").is_err());
        assert!(PathTemplate::parse("usuarios/{}").is_err());
    }

    #[test]
    fn test_resource_name_to_path() {
        assert_eq!(
            resource_name_to_path("projects/fitlab/databases/(default)/documents/usuarios/u1/checkins/c1"),
            "usuarios/u1/checkins/c1"
        );
        assert_eq!(resource_name_to_path("usuarios/u1"), "usuarios/u1");
    }

    #[test]
    fn test_documents_segment_inside_path_is_kept() {
        assert_eq!(
            resource_name_to_path("projects/fitlab/databases/(default)/documents/usuarios/documents/checkins/c1"),
            "usuarios/documents/checkins/c1"
        );
        assert_eq!(
            resource_name_to_path("usuarios/documents/checkins/c1"),
            "usuarios/documents/checkins/c1"
        );

        let params = checkins().matches(resource_name_to_path("usuarios/documents/checkins/c1")).unwrap();
        assert_eq!(params.get("uid"), Some("documents"));
    }
}
