use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkin Trigger",
        version = "1.0.0",
        description = "Receives Firestore document events for `usuarios/{uid}/checkins/{checkinId}` (CloudEvents over HTTP) and looks up the parent user document.\n\n**Responses:** 200 when the event was handled, 400 for malformed events, 500 when the user read failed (the platform may redeliver)."
    ),
    paths(
        crate::api::events::receive_event,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::api::events::EventResponse,
            crate::services::checkin_service::CheckinOutcome,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Events", description = "Document change events delivered by the platform."),
        (name = "Health", description = "Health check and HTTP counters."),
    )
)]
pub struct ApiDoc;
