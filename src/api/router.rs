use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{
    availability, availability_rule, blocked_interval, booking, booking_management, health,
    session_type, therapist,
};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public booking funnel ({id} is the public slug on these routes)
        .route("/api/v1/therapists", get(therapist::list_therapists).post(therapist::create_therapist))
        .route("/api/v1/therapists/{id}", get(therapist::get_therapist_by_slug))
        .route("/api/v1/therapists/{id}/session-types", get(session_type::list_session_types_public).post(session_type::create_session_type))
        .route("/api/v1/therapists/{id}/dates", get(availability::get_available_dates))
        .route("/api/v1/therapists/{id}/slots", get(availability::get_slots))
        .route("/api/v1/therapists/{id}/book", post(booking::create_booking))

        // Client self-service by management token
        .route("/api/v1/bookings/manage/{token}", get(booking_management::get_booking_by_token))
        .route("/api/v1/bookings/manage/{token}/cancel", post(booking_management::cancel_booking))
        .route("/api/v1/bookings/manage/{token}/reschedule", post(booking_management::reschedule_booking))

        // Therapist administration
        .route("/api/v1/therapists/{id}/profile", put(therapist::update_therapist).delete(therapist::archive_therapist))
        .route("/api/v1/therapists/{id}/rules", get(availability_rule::list_rules).post(availability_rule::create_rule))
        .route("/api/v1/rules/{rule_id}", put(availability_rule::update_rule).delete(availability_rule::delete_rule))
        .route("/api/v1/therapists/{id}/blocks", get(blocked_interval::list_blocked_intervals).post(blocked_interval::create_blocked_interval))
        .route("/api/v1/blocks/{block_id}", delete(blocked_interval::delete_blocked_interval))
        .route("/api/v1/session-types/{type_id}", put(session_type::update_session_type).delete(session_type::delete_session_type))

        // Staff booking management
        .route("/api/v1/therapists/{id}/bookings", post(booking::create_booking_as_staff))
        .route("/api/v1/bookings", get(booking::list_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/reschedule", post(booking::reschedule_booking))
        .route("/api/v1/bookings/{booking_id}/status", post(booking::update_booking_status))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
