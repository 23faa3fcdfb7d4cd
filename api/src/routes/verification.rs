//! Code form, code submission and resend

use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::Value;

use tfa_core::domain::value_objects::pending_login::USER_ID_KEY;
use tfa_core::{CodeFormView, DeliveryChannel, DomainError, RequestContext, Session};

use super::{client_ip, respond, see_other};
use crate::app::AppState;
use crate::dto::{CodeSubmitRequest, ResendQuery};
use crate::handlers::error::ApiError;
use crate::session::RequestSession;

/// GET on the verification path: the form description, or 303 to login
pub async fn show_code_form(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let mut session = RequestSession::load(&req, &state).await?;

    match state.service.show_code_form(session.data_mut()) {
        CodeFormView::Form(form) => {
            let mut response = HttpResponse::Ok();
            session.commit(&state, &mut response).await?;
            Ok(response.json(form))
        }
        CodeFormView::Redirect { to } => Ok(see_other(&to).finish()),
    }
}

/// POST on the verification path
///
/// Throttled per pending user and client address.
pub async fn submit_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<CodeSubmitRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut session = RequestSession::load(&req, &state).await?;

    let pending_user = session
        .data()
        .get(USER_ID_KEY)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let ctx = RequestContext::new(pending_user, client_ip(&req));

    let outcome = state
        .service
        .submit_code(&ctx, &request.code, session.data_mut())
        .await?;

    respond(outcome, session, &state).await
}

/// POST `<verification path>/resend?via=sms|call`
///
/// Always answers `200` with `{ "error": bool, "message": ... }` unless the
/// channel is unknown.
pub async fn resend_code(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ResendQuery>,
) -> Result<HttpResponse, ApiError> {
    let channel = match query.via.as_deref() {
        Some(via) => DeliveryChannel::from_str(via).map_err(DomainError::from)?,
        None => DeliveryChannel::default(),
    };

    let session = RequestSession::load(&req, &state).await?;
    let result = state.service.resend_code(session.data(), channel).await?;

    tracing::info!(
        channel = %channel,
        sent = !result.error,
        event = "code_resend",
        "Resend requested"
    );

    Ok(HttpResponse::Ok().json(result))
}
