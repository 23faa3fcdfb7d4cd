//! POST /login

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use tfa_core::RequestContext;

use super::{client_ip, respond};
use crate::app::AppState;
use crate::dto::LoginRequest;
use crate::handlers::error::ApiError;
use crate::session::RequestSession;

/// Check the password and send a verification code
///
/// # Request Body
///
/// ```json
/// { "email": "jane@example.com", "password": "secret", "remember": true }
/// ```
///
/// # Response
///
/// - `303` to the code form once the code is on its way
/// - `303` back to the login form with a flashed error
/// - `422` when the body fails validation
/// - `429` with `Retry-After` after too many failures
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let ctx = RequestContext::new(request.email.clone(), client_ip(&req));
    let mut session = RequestSession::load(&req, &state).await?;

    let outcome = state
        .service
        .login(&ctx, &request.credentials(), session.data_mut())
        .await?;

    respond(outcome, session, &state).await
}
