// ==================== TRIGGER BINDING (CloudEvents via HTTP) ====================
// POST / recebe eventos de documento do Firestore (Eventarc) e despacha para o handler
// 200 = handler concluiu, 400 = evento inválido (não reentregar), 500 = falha do banco (plataforma faz retry)

use crate::{
    database::DocumentStore,
    models::{CloudEvent, DocumentEventData, EventContext, FirestoreEventType, Change},
    services::checkin_service::{self, CheckinOutcome},
    utils::{error::AppError, path_template::PathTemplate},
};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Estado compartilhado do endpoint: handle único do banco + template do trigger
pub struct CheckinTrigger {
    pub store: Arc<dyn DocumentStore>,
    pub template: PathTemplate,
}

impl CheckinTrigger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Result<Self, AppError> {
        Ok(Self {
            store,
            template: PathTemplate::parse(checkin_service::CHECKIN_TRIGGER_PATH)?,
        })
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CheckinOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventResponse {
    fn failure(event_id: Option<String>, error: &AppError) -> Self {
        Self {
            success: false,
            event_id,
            outcome: None,
            error: Some(error.to_string()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    request_body(
        content = String,
        description = "Firestore document event (CloudEvents binary mode with JSON DocumentEventData, or structured mode)",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Event handled", body = EventResponse),
        (status = 400, description = "Malformed or unsupported event", body = EventResponse),
        (status = 500, description = "Document read failed; the platform may redeliver", body = EventResponse)
    )
)]
pub async fn receive_event(
    req: HttpRequest,
    body: web::Bytes,
    trigger: web::Data<CheckinTrigger>,
) -> HttpResponse {
    let event = match parse_cloud_event(&req, &body) {
        Ok(event) => event,
        Err(e) => {
            log::warn!("⚠️ Rejecting event: {}", e);
            return HttpResponse::BadRequest().json(EventResponse::failure(None, &e));
        }
    };

    let event_id = event.id.clone();
    let (change, context) = match bind_event(event, &trigger.template) {
        Ok(bound) => bound,
        Err(e) => {
            log::warn!("⚠️ Rejecting event {}: {}", event_id, e);
            return HttpResponse::BadRequest().json(EventResponse::failure(Some(event_id), &e));
        }
    };

    // sem o caminho: o uid só aparece no log do handler
    log::debug!(
        "📥 Event {} from '{}' ({:?}, change {:?}, time {:?})",
        context.event_id,
        context.source,
        context.event_type,
        change.kind(),
        context.timestamp
    );

    match checkin_service::on_checkin_write(trigger.store.as_ref(), &change, &context).await {
        Ok(outcome) => HttpResponse::Ok().json(EventResponse {
            success: true,
            event_id: Some(event_id),
            outcome: Some(outcome),
            error: None,
        }),
        Err(e @ AppError::InvalidEvent(_)) => {
            log::warn!("⚠️ Rejecting event {}: {}", event_id, e);
            HttpResponse::BadRequest().json(EventResponse::failure(Some(event_id), &e))
        }
        Err(e) => {
            log::error!("❌ Checkin handler failed for event {}: {}", event_id, e);
            HttpResponse::InternalServerError().json(EventResponse::failure(Some(event_id), &e))
        }
    }
}

/// Normaliza o CloudEvent a partir do modo estruturado ou binário
pub fn parse_cloud_event(req: &HttpRequest, body: &[u8]) -> Result<CloudEvent, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();

    if content_type == STRUCTURED_CONTENT_TYPE {
        return serde_json::from_slice(body)
            .map_err(|e| AppError::InvalidEvent(format!("invalid structured CloudEvent: {}", e)));
    }

    let id = ce_header(req, "ce-id")?
        .ok_or_else(|| AppError::InvalidEvent("missing ce-id header".to_string()))?;
    let event_type = ce_header(req, "ce-type")?
        .ok_or_else(|| AppError::InvalidEvent("missing ce-type header".to_string()))?;

    let time = match ce_header(req, "ce-time")? {
        Some(t) => Some(
            DateTime::parse_from_rfc3339(&t)
                .map_err(|e| AppError::InvalidEvent(format!("invalid ce-time '{}': {}", t, e)))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let data = if body.is_empty() {
        None
    } else {
        match content_type.as_str() {
            "" | "application/json" => Some(
                serde_json::from_slice::<DocumentEventData>(body)
                    .map_err(|e| AppError::InvalidEvent(format!("invalid event data: {}", e)))?,
            ),
            other => {
                return Err(AppError::InvalidEvent(format!(
                    "unsupported event data content type '{}' (configure the trigger with application/json)",
                    other
                )))
            }
        }
    };

    Ok(CloudEvent {
        id,
        source: ce_header(req, "ce-source")?.unwrap_or_default(),
        event_type,
        subject: ce_header(req, "ce-subject")?,
        time,
        document: ce_header(req, "ce-document")?,
        data,
    })
}

/// Valor de um atributo ce-* no modo binário, já sem percent-encoding
/// (o binding HTTP codifica não-ASCII, espaço, aspas e '%')
fn ce_header(req: &HttpRequest, name: &str) -> Result<Option<String>, AppError> {
    let raw = match req.headers().get(name) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::InvalidEvent(format!("{} header is not valid ASCII", name)))?,
        None => return Ok(None),
    };

    if raw.is_empty() {
        return Ok(None);
    }

    let decoded = urlencoding::decode(raw)
        .map_err(|e| AppError::InvalidEvent(format!("invalid percent-encoding in {}: {}", name, e)))?;
    Ok(Some(decoded.into_owned()))
}

/// Valida o tipo, casa o caminho com o template e monta (Change, EventContext)
pub fn bind_event(event: CloudEvent, template: &PathTemplate) -> Result<(Change, EventContext), AppError> {
    let event_type = FirestoreEventType::parse(&event.event_type)
        .ok_or_else(|| AppError::InvalidEvent(format!("unsupported event type '{}'", event.event_type)))?;

    let path = event
        .document_path()
        .ok_or_else(|| AppError::InvalidEvent("could not resolve the changed document path".to_string()))?;

    let params = template.matches(&path).ok_or_else(|| {
        AppError::InvalidEvent(format!("document '{}' does not match '{}'", path, template.as_str()))
    })?;

    let change = event.data.unwrap_or_default().into_change(&path);
    let context = EventContext {
        event_id: event.id,
        event_type,
        source: event.source,
        timestamp: event.time,
        params,
    };

    Ok((change, context))
}
