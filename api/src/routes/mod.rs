//! Route handlers

pub mod health;
pub mod login;
pub mod twilio;
pub mod verification;

use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};

use tfa_core::FlowOutcome;

use crate::app::AppState;
use crate::handlers::error::ApiError;
use crate::session::RequestSession;

/// Address used for throttling; `unknown` when the peer cannot be determined
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

pub(crate) fn see_other(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(StatusCode::SEE_OTHER);
    builder.insert_header((header::LOCATION, location.to_string()));
    builder
}

/// Render a flow outcome, persisting the session alongside it
pub(crate) async fn respond(
    outcome: FlowOutcome,
    session: RequestSession,
    state: &AppState,
) -> Result<HttpResponse, ApiError> {
    match outcome {
        FlowOutcome::Redirect { to } | FlowOutcome::RedirectWithError { to, .. } => {
            let mut response = see_other(&to);
            session.commit(state, &mut response).await?;
            Ok(response.finish())
        }
        FlowOutcome::Lockout(lockout) => {
            let error = ApiError::from(lockout.error());
            let mut response = error.response_builder();
            session.commit(state, &mut response).await?;
            Ok(response.json(error.body()))
        }
    }
}
