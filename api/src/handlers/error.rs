//! API error type and its JSON rendering

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use validator::ValidationErrors;

use tfa_core::{AuthError, DomainError};
use tfa_shared::{error_codes, ErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Request validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    BadRequest { field: String, message: String },
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Domain(DomainError::ValidationErr(_) | DomainError::Validation { .. })
            | ApiError::Validation(_) => error_codes::VALIDATION_ERROR,
            ApiError::Domain(DomainError::Auth(AuthError::TooManyAttempts { .. })) => {
                error_codes::TOO_MANY_ATTEMPTS
            }
            ApiError::Domain(DomainError::Auth(AuthError::InvalidCredentials)) => {
                error_codes::INVALID_CREDENTIALS
            }
            ApiError::Domain(DomainError::Auth(AuthError::InvalidToken)) => {
                error_codes::INVALID_TOKEN
            }
            ApiError::Domain(DomainError::Auth(AuthError::DeliveryFailure)) => {
                error_codes::DELIVERY_FAILED
            }
            ApiError::Domain(DomainError::Auth(_)) => error_codes::BAD_REQUEST,
            ApiError::Domain(DomainError::NotFound { .. }) => error_codes::BAD_REQUEST,
            ApiError::Domain(_) => error_codes::INTERNAL_ERROR,
            ApiError::BadRequest { .. } => error_codes::BAD_REQUEST,
        }
    }

    /// Status line and headers, without the body
    pub(crate) fn response_builder(&self) -> HttpResponseBuilder {
        let mut response = HttpResponse::build(self.status_code());
        if let ApiError::Domain(DomainError::Auth(AuthError::TooManyAttempts {
            retry_after_seconds,
        })) = self
        {
            response.insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()));
        }
        response
    }

    pub(crate) fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Domain(DomainError::ValidationErr(err)) => {
                ErrorResponse::new(self.code(), err.to_string()).add_detail("field", err.field())
            }
            ApiError::Validation(errors) => {
                let mut response = ErrorResponse::new(self.code(), self.to_string());
                for (field, errs) in errors.field_errors() {
                    let messages: Vec<String> = errs
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    response = response.add_detail(field.to_string(), messages);
                }
                response
            }
            ApiError::Domain(DomainError::Auth(AuthError::TooManyAttempts {
                retry_after_seconds,
            })) => ErrorResponse::new(self.code(), self.to_string())
                .add_detail("retry_after_seconds", retry_after_seconds),
            // Store and configuration failures stay in the logs
            ApiError::Domain(
                DomainError::Persistence { .. }
                | DomainError::Configuration { .. }
                | DomainError::Internal { .. },
            ) => ErrorResponse::new(self.code(), "An internal error occurred"),
            ApiError::BadRequest { field, message } => {
                ErrorResponse::new(self.code(), message.clone()).add_detail("field", field)
            }
            _ => ErrorResponse::new(self.code(), self.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::ValidationErr(_) | DomainError::Validation { .. })
            | ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Domain(DomainError::Auth(AuthError::TooManyAttempts { .. })) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Domain(DomainError::Auth(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        self.response_builder().json(self.body())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Domain(DomainError::Auth(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use tfa_core::{LockoutResponse, ValidationError};

    async fn json_body(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_validation_error_is_422() {
        let error = ApiError::from(DomainError::from(ValidationError::RequiredField {
            field: "code".to_string(),
        }));
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"], error_codes::VALIDATION_ERROR);
        assert_eq!(body["details"]["field"], "code");
    }

    #[actix_rt::test]
    async fn test_lockout_sets_retry_after() {
        let response = ApiError::from(LockoutResponse::new(42).error()).error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );

        let body = json_body(response).await;
        assert_eq!(body["error"], error_codes::TOO_MANY_ATTEMPTS);
        assert_eq!(body["details"]["retry_after_seconds"], 42);
    }

    #[actix_rt::test]
    async fn test_persistence_error_is_hidden() {
        let response = ApiError::from(DomainError::persistence("connection reset")).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        assert_eq!(body["error"], error_codes::INTERNAL_ERROR);
        assert!(!body["message"].as_str().unwrap().contains("connection reset"));
    }
}
