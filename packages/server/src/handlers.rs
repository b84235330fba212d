//! HTTP handler functions for the Mangrove Watch API.

use actix_web::{HttpRequest, HttpResponse, web};
use mangrove_watch_analytics_models::ReportQuery;
use mangrove_watch_auth::Credentials;
use mangrove_watch_events::ContextId;
use mangrove_watch_geocoder::nominatim;
use mangrove_watch_report_models::{ReportDraft, ReportStatus};
use mangrove_watch_server_models::{
    ApiHealth, EventStreamParams, GeocodeParams, GeocodeResponse, LoginResponse, MyReportsParams,
    ReportListParams, SetStatusRequest, SubmitReportRequest,
};
use mangrove_watch_store::StoreError;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/reports`
///
/// The authority review table: optional status filter plus free-text
/// search, newest first.
pub async fn list_reports(
    state: web::Data<AppState>,
    params: web::Query<ReportListParams>,
) -> HttpResponse {
    let status = match params.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => match raw.parse::<ReportStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("unrecognized status '{raw}'")
                }));
            }
        },
    };

    let query = ReportQuery {
        status,
        search: params.q.clone(),
    };
    let rows = mangrove_watch_analytics::authority_table(&state.store.snapshot(), &query);
    HttpResponse::Ok().json(rows)
}

/// `POST /api/reports`
///
/// Citizen submission. The server assigns the id, timestamp, and initial
/// `pending` status; validation failures reject the whole submission
/// before anything is written.
pub async fn submit_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SubmitReportRequest>,
) -> HttpResponse {
    let draft: ReportDraft = body.into_inner().into();
    match draft.submit() {
        Ok(report) => {
            state.store.upsert(report.clone(), context_id(&req));
            log::info!("new report {} from '{}'", report.id, report.reporter_name);
            HttpResponse::Created().json(report)
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })),
    }
}

/// `POST /api/reports/{id}/status`
///
/// Authority status update. Unrecognized status values are rejected
/// before the store is touched.
pub async fn set_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SetStatusRequest>,
) -> HttpResponse {
    let Ok(status) = body.status.parse::<ReportStatus>() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("unrecognized status '{}'", body.status)
        }));
    };

    match state.store.set_status(path.as_str(), status, context_id(&req)) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e @ StoreError::NotFound { .. }) => HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        })),
    }
}

/// `GET /api/reports/mine?name=`
pub async fn my_reports(
    state: web::Data<AppState>,
    params: web::Query<MyReportsParams>,
) -> HttpResponse {
    let mine = mangrove_watch_analytics::my_reports(&state.store.snapshot(), &params.name);
    HttpResponse::Ok().json(mine)
}

/// `GET /api/leaderboard`
pub async fn leaderboard(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(mangrove_watch_analytics::leaderboard(&state.store.snapshot()))
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(mangrove_watch_analytics::status_counts(
        &state.store.snapshot(),
    ))
}

/// `GET /api/export`
///
/// The full snapshot as a CSV download.
pub async fn export_csv(state: web::Data<AppState>) -> HttpResponse {
    match mangrove_watch_export::reports_to_csv(&state.store.snapshot()) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv")
            .insert_header((
                "Content-Disposition",
                format!(
                    "attachment; filename=\"{}\"",
                    mangrove_watch_export::EXPORT_FILE_NAME
                ),
            ))
            .body(csv),
        Err(e) => {
            log::error!("failed to export reports: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to export reports"
            }))
        }
    }
}

/// `GET /api/geocode?q=`
///
/// Proxied Nominatim lookup. A lookup that finds nothing is a normal
/// response; a transport failure is a 502 with a retry prompt and is
/// never retried automatically.
pub async fn geocode(
    state: web::Data<AppState>,
    params: web::Query<GeocodeParams>,
) -> HttpResponse {
    let query = params.q.trim();
    if query.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Type a location first"
        }));
    }

    match nominatim::geocode_freeform(&state.http, &state.geocoder.base_url, query).await {
        Ok(Some(place)) => HttpResponse::Ok().json(GeocodeResponse::from(place)),
        Ok(None) => HttpResponse::Ok().json(GeocodeResponse::no_match()),
        Err(e) => {
            log::error!("geocoding failed for '{query}': {e}");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "Geocoding failed. Check your internet and try again."
            }))
        }
    }
}

/// `POST /api/login`
///
/// Demo credential gate for the authority view. Not a security boundary.
pub async fn login(state: web::Data<AppState>, body: web::Json<Credentials>) -> HttpResponse {
    let credentials = body.into_inner();
    let authorized = state.auth.is_authorized(&credentials);
    if !authorized {
        log::debug!("rejected login for '{}'", credentials.username);
    }
    HttpResponse::Ok().json(LoginResponse { authorized })
}

/// `GET /api/events`
///
/// Server-sent event stream of store changes for one context. The
/// context id comes from the `context` query parameter (EventSource
/// cannot set headers) or the `X-Context-Id` header; events that context
/// originated are filtered out by the bus.
pub async fn events(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<EventStreamParams>,
) -> HttpResponse {
    let context = params
        .context
        .as_deref()
        .and_then(|raw| raw.parse::<ContextId>().ok())
        .unwrap_or_else(|| context_id(&req));

    let mut subscription = state.bus.subscribe(context);
    let stream = async_stream::stream! {
        while let Some(event) = subscription.recv().await {
            match serde_json::to_string(&event) {
                Ok(payload) => {
                    yield Ok::<web::Bytes, actix_web::Error>(web::Bytes::from(format!(
                        "data: {payload}\n\n"
                    )));
                }
                Err(e) => log::error!("failed to serialize event: {e}"),
            }
        }
    };

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

/// Extracts the caller's context id from the `X-Context-Id` header.
///
/// A missing or malformed header yields a fresh id, which degrades
/// safely: the write is then broadcast to every subscriber.
pub(crate) fn context_id(req: &HttpRequest) -> ContextId {
    req.headers()
        .get("X-Context-Id")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn context_id_comes_from_the_header() {
        let wanted: ContextId = "6f2b9e4c-9a1d-4c5e-8b1f-2d3a4e5f6a7b".parse().unwrap();
        let req = TestRequest::default()
            .insert_header(("X-Context-Id", "6f2b9e4c-9a1d-4c5e-8b1f-2d3a4e5f6a7b"))
            .to_http_request();
        assert_eq!(context_id(&req), wanted);
    }

    #[test]
    fn malformed_context_header_falls_back_to_a_fresh_id() {
        let req = TestRequest::default()
            .insert_header(("X-Context-Id", "not-a-uuid"))
            .to_http_request();
        let a = context_id(&req);
        let b = context_id(&req);
        assert_ne!(a, b);
    }
}
