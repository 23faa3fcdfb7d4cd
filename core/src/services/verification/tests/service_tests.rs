//! Unit tests for the second-factor flow

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{UserRecord, VerificationToken};
use crate::domain::session::{take_flashed_errors, Session, SessionData};
use crate::domain::value_objects::{
    DeliveryChannel, LoginCredentials, PendingLogin, RequestContext,
};
use crate::errors::{AuthError, DomainError, ValidationError};
use crate::repositories::{InMemoryTokenRepository, InMemoryUserRepository, TokenRepository};
use crate::services::auth_guard::{AuthGuard, SessionAuthGuard};
use crate::services::listeners::TokenPurgeListener;
use crate::services::throttle::InMemoryThrottle;
use crate::services::verification::{
    CodeFormView, FlowOutcome, TwoFactorCollaborators, TwoFactorService, TwoFactorServiceConfig,
};

use super::mocks::{
    FailingTokenRepository, FailingUserLookup, RecordingGateway, RecordingListener,
};

const PASSWORD: &str = "s3cret-pass";

struct Fixture {
    service: TwoFactorService,
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<InMemoryTokenRepository>,
    gateway: Arc<RecordingGateway>,
    throttle: Arc<InMemoryThrottle>,
    listener: Arc<RecordingListener>,
    user: UserRecord,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_gateway(RecordingGateway::new()).await
    }

    async fn with_gateway(gateway: RecordingGateway) -> Self {
        let users = Arc::new(InMemoryUserRepository::with_bcrypt_cost(4));
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let gateway = Arc::new(gateway);
        let throttle = Arc::new(InMemoryThrottle::new(3, 60));
        let listener = Arc::new(RecordingListener::default());

        let user = UserRecord::new("jane@example.com", "+1", "4155552671");
        users.add_user(user.clone(), PASSWORD).await.unwrap();

        let service = TwoFactorService::new(
            TwoFactorCollaborators {
                credentials: users.clone(),
                users: users.clone(),
                tokens: tokens.clone(),
                gateway: gateway.clone(),
                guard: Arc::new(SessionAuthGuard),
            },
            TwoFactorServiceConfig::default(),
        )
        .with_throttle(throttle.clone())
        .with_listener(listener.clone());

        Self {
            service,
            users,
            tokens,
            gateway,
            throttle,
            listener,
            user,
        }
    }

    fn ctx(&self) -> RequestContext {
        RequestContext::new(self.user.email.clone(), "127.0.0.1")
    }

    fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(self.user.email.clone(), PASSWORD, false)
    }

    /// Log in and return the delivered code
    async fn login(&self, session: &mut SessionData) -> String {
        let outcome = self
            .service
            .login(&self.ctx(), &self.credentials(), session)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            FlowOutcome::Redirect {
                to: "/login/tfa".to_string()
            }
        );
        self.gateway.last_code().unwrap()
    }

    /// Put a hand-made token in the store and bind it to the session
    async fn pending_token(&self, session: &mut SessionData, token: &VerificationToken) {
        self.tokens.create(token).await.unwrap();
        PendingLogin::new(token.id, self.user.id, false).store(session);
    }
}

#[tokio::test]
async fn test_login_sends_code_and_binds_session() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();

    let code = fixture.login(&mut session).await;

    let pending = PendingLogin::load(&session).unwrap();
    assert_eq!(pending.user_id, fixture.user.id);
    assert!(!pending.remember);

    let token = fixture.tokens.find_by_id(pending.token_id).await.unwrap().unwrap();
    assert_eq!(token.code, code);
    assert_eq!(token.code.len(), 6);
    assert!(!token.used);

    let messages = fixture.gateway.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].channel, DeliveryChannel::Sms);
    assert_eq!(messages[0].destination, "+14155552671");
    assert_eq!(messages[0].text, format!("Your verification code is {}", code));
}

#[tokio::test]
async fn test_login_remember_flag_is_stored() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let credentials = LoginCredentials::new(fixture.user.email.clone(), PASSWORD, true);

    fixture
        .service
        .login(&fixture.ctx(), &credentials, &mut session)
        .await
        .unwrap();

    assert!(PendingLogin::load(&session).unwrap().remember);
}

#[tokio::test]
async fn test_login_with_bad_password_redirects_back() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let credentials = LoginCredentials::new(fixture.user.email.clone(), "wrong", false);

    let outcome = fixture
        .service
        .login(&fixture.ctx(), &credentials, &mut session)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::RedirectWithError {
            to: "/login".to_string(),
            error: AuthError::InvalidCredentials,
        }
    );
    assert!(fixture.tokens.is_empty().await);
    assert!(fixture.gateway.messages().is_empty());
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 1);
    assert_eq!(take_flashed_errors(&mut session).len(), 1);
}

#[tokio::test]
async fn test_login_with_missing_fields_is_a_validation_error() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let credentials = LoginCredentials::new("", PASSWORD, false);

    let result = fixture
        .service
        .login(&fixture.ctx(), &credentials, &mut session)
        .await;

    match result {
        Err(DomainError::ValidationErr(ValidationError::RequiredField { field })) => {
            assert_eq!(field, "email");
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 0);
}

#[tokio::test]
async fn test_delivery_failure_deletes_token() {
    let fixture = Fixture::with_gateway(RecordingGateway::failing()).await;
    let mut session = SessionData::new();

    let outcome = fixture
        .service
        .login(&fixture.ctx(), &fixture.credentials(), &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::DeliveryFailure));
    assert_eq!(outcome.location(), Some("/login"));
    assert!(fixture.tokens.find_by_user_id(fixture.user.id).await.unwrap().is_empty());
    assert!(!PendingLogin::is_present(&session));
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 1);
}

#[tokio::test]
async fn test_second_factor_disabled_is_a_failed_login() {
    let fixture = Fixture::new().await;
    let mut disabled = fixture.user.clone();
    disabled.second_factor_enabled = false;
    fixture.users.update_user(disabled).await.unwrap();
    let mut session = SessionData::new();

    let outcome = fixture
        .service
        .login(&fixture.ctx(), &fixture.credentials(), &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::SecondFactorDisabled));
    assert!(fixture.tokens.is_empty().await);
    assert!(fixture.gateway.messages().is_empty());
    assert!(!PendingLogin::is_present(&session));
}

#[tokio::test]
async fn test_new_login_abandons_previous_pending_state() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let stale = PendingLogin::new(Uuid::new_v4(), Uuid::new_v4(), true);
    stale.store(&mut session);

    let credentials = LoginCredentials::new(fixture.user.email.clone(), "wrong", false);
    fixture
        .service
        .login(&fixture.ctx(), &credentials, &mut session)
        .await
        .unwrap();

    assert!(!PendingLogin::is_present(&session));
}

#[tokio::test]
async fn test_login_locked_out_after_repeated_failures() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let credentials = LoginCredentials::new(fixture.user.email.clone(), "wrong", false);

    for _ in 0..3 {
        fixture
            .service
            .login(&fixture.ctx(), &credentials, &mut session)
            .await
            .unwrap();
    }

    // Correct password is refused while locked out
    let outcome = fixture
        .service
        .login(&fixture.ctx(), &fixture.credentials(), &mut session)
        .await
        .unwrap();

    match outcome {
        FlowOutcome::Lockout(lockout) => assert!(lockout.retry_after_seconds > 0),
        other => panic!("Expected lockout, got {:?}", other),
    }
    assert!(fixture.gateway.messages().is_empty());
}

#[tokio::test]
async fn test_submit_without_pending_state_redirects_to_login() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), "123456", &mut session)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::Redirect {
            to: "/login".to_string()
        }
    );
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 0);
}

#[tokio::test]
async fn test_submit_empty_code_is_a_validation_error() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    fixture.login(&mut session).await;

    let result = fixture
        .service
        .submit_code(&fixture.ctx(), "  ", &mut session)
        .await;

    assert!(matches!(result, Err(ref e) if e.is_validation()));
    assert!(PendingLogin::is_present(&session));
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 0);
}

#[tokio::test]
async fn test_submit_correct_code_authenticates() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;
    let token_id = PendingLogin::load(&session).unwrap().token_id;

    // A stray failure is cleared by the successful submission
    fixture
        .service
        .submit_code(&fixture.ctx(), "000", &mut session)
        .await
        .unwrap();

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), &code, &mut session)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::Redirect {
            to: "/home".to_string()
        }
    );
    assert_eq!(
        SessionAuthGuard.authenticated_user(&session),
        Some(fixture.user.id)
    );
    assert!(!PendingLogin::is_present(&session));
    assert!(fixture.tokens.find_by_id(token_id).await.unwrap().unwrap().used);
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 0);
    assert_eq!(*fixture.listener.users.lock().unwrap(), vec![fixture.user.id]);
}

#[tokio::test]
async fn test_padded_code_is_not_trimmed() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), &format!(" {} ", code), &mut session)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        FlowOutcome::RedirectWithError {
            error: AuthError::InvalidToken,
            ..
        }
    ));
    assert!(PendingLogin::is_present(&session));
    assert_eq!(SessionAuthGuard.authenticated_user(&session), None);
}

#[tokio::test]
async fn test_success_clears_password_step_failures() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let wrong = LoginCredentials::new(fixture.user.email.clone(), "nope", false);
    fixture
        .service
        .login(&fixture.ctx(), &wrong, &mut session)
        .await
        .unwrap();
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 1);

    let code = fixture.login(&mut session).await;
    let submit_ctx = RequestContext::new(fixture.user.id.to_string(), "127.0.0.1");
    fixture
        .service
        .submit_code(&submit_ctx, &code, &mut session)
        .await
        .unwrap();

    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 0);
    assert_eq!(PendingLogin::identifier(&session), None);
}

#[tokio::test]
async fn test_wrong_code_keeps_pending_state() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;
    let wrong = if code == "111111" { "222222" } else { "111111" };

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), wrong, &mut session)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::RedirectWithError {
            to: "/login/tfa".to_string(),
            error: AuthError::InvalidToken,
        }
    );
    assert!(PendingLogin::is_present(&session));
    assert_eq!(SessionAuthGuard.authenticated_user(&session), None);
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 1);
    assert!(fixture.listener.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_of_another_user_is_rejected() {
    let fixture = Fixture::new().await;
    let other = UserRecord::new("sam@example.com", "+44", "2071838750");
    fixture.users.add_user(other.clone(), "pw").await.unwrap();

    // Session claims the fixture user, token belongs to someone else
    let token = VerificationToken::with_code(other.id, "4821");
    let mut session = SessionData::new();
    fixture.pending_token(&mut session, &token).await;

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), "4821", &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::InvalidToken));
    assert!(!fixture.tokens.find_by_id(token.id).await.unwrap().unwrap().used);
    assert_eq!(SessionAuthGuard.authenticated_user(&session), None);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let fixture = Fixture::new().await;
    let mut token = VerificationToken::with_code(fixture.user.id, "4821");
    token.created_at = Utc::now() - Duration::minutes(16);
    let mut session = SessionData::new();
    fixture.pending_token(&mut session, &token).await;

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), "4821", &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::InvalidToken));
}

#[tokio::test]
async fn test_used_token_cannot_be_replayed() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;
    let pending = PendingLogin::load(&session).unwrap();

    fixture
        .service
        .submit_code(&fixture.ctx(), &code, &mut session)
        .await
        .unwrap();

    // Replay the same pending state against the now-used token
    let mut replay = SessionData::new();
    pending.store(&mut replay);
    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), &code, &mut replay)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::InvalidToken));
    assert_eq!(SessionAuthGuard.authenticated_user(&replay), None);
}

#[tokio::test]
async fn test_malformed_session_ids_count_as_invalid_token() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    session.set("token_id", json!("garbage"));
    session.set("user_id", json!(fixture.user.id.to_string()));

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), "123456", &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.error(), Some(AuthError::InvalidToken));
    assert_eq!(fixture.throttle.attempts(&fixture.ctx()).await, 1);
}

#[tokio::test]
async fn test_submit_locked_out() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;

    for _ in 0..3 {
        fixture
            .service
            .submit_code(&fixture.ctx(), "0", &mut session)
            .await
            .unwrap();
    }

    let outcome = fixture
        .service
        .submit_code(&fixture.ctx(), &code, &mut session)
        .await
        .unwrap();

    assert!(matches!(outcome, FlowOutcome::Lockout(_)));
    assert_eq!(SessionAuthGuard.authenticated_user(&session), None);
}

#[tokio::test]
async fn test_resend_reuses_token() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    let code = fixture.login(&mut session).await;

    let result = fixture
        .service
        .resend_code(&session, DeliveryChannel::Call)
        .await
        .unwrap();

    assert!(!result.error);
    assert_eq!(fixture.tokens.len().await, 1);

    let messages = fixture.gateway.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].channel, DeliveryChannel::Call);
    assert_eq!(messages[1].code, code);
    assert!(messages[1].text.starts_with("Your verification code is "));
}

#[tokio::test]
async fn test_resend_with_missing_token_fails() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    PendingLogin::new(Uuid::new_v4(), fixture.user.id, false).store(&mut session);

    let result = fixture
        .service
        .resend_code(&session, DeliveryChannel::Sms)
        .await
        .unwrap();

    assert!(result.error);
    assert!(result.message.is_some());
    assert!(fixture.gateway.messages().is_empty());
}

#[tokio::test]
async fn test_resend_refuses_expired_token() {
    let fixture = Fixture::new().await;
    let mut token = VerificationToken::with_code(fixture.user.id, "4821");
    token.created_at = Utc::now() - Duration::minutes(20);
    let mut session = SessionData::new();
    fixture.pending_token(&mut session, &token).await;

    let result = fixture
        .service
        .resend_code(&session, DeliveryChannel::Sms)
        .await
        .unwrap();

    assert!(result.error);
    assert!(fixture.gateway.messages().is_empty());
}

#[tokio::test]
async fn test_resend_without_pending_login_fails() {
    let fixture = Fixture::new().await;
    let session = SessionData::new();

    let result = fixture
        .service
        .resend_code(&session, DeliveryChannel::Sms)
        .await
        .unwrap();

    assert!(result.error);
}

#[tokio::test]
async fn test_resend_reports_gateway_failure() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();
    fixture.login(&mut session).await;
    fixture
        .gateway
        .should_fail
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let result = fixture
        .service
        .resend_code(&session, DeliveryChannel::Sms)
        .await
        .unwrap();

    assert!(result.error);
    assert_eq!(
        result.message,
        Some(AuthError::DeliveryFailure.to_string())
    );
}

#[tokio::test]
async fn test_code_form_requires_pending_login() {
    let fixture = Fixture::new().await;
    let mut session = SessionData::new();

    assert_eq!(
        fixture.service.show_code_form(&mut session),
        CodeFormView::Redirect {
            to: "/login".to_string()
        }
    );

    fixture.login(&mut session).await;
    fixture
        .service
        .submit_code(&fixture.ctx(), "0", &mut session)
        .await
        .unwrap();

    match fixture.service.show_code_form(&mut session) {
        CodeFormView::Form(form) => {
            assert_eq!(form.action, "/login/tfa");
            assert_eq!(form.resend_action, "/login/tfa/resend");
            assert_eq!(form.code_length, 6);
            assert_eq!(form.errors, vec![AuthError::InvalidToken.to_string()]);
        }
        other => panic!("Expected form, got {:?}", other),
    }

    // Flashed errors are shown once
    match fixture.service.show_code_form(&mut session) {
        CodeFormView::Form(form) => assert!(form.errors.is_empty()),
        other => panic!("Expected form, got {:?}", other),
    }
}

#[tokio::test]
async fn test_token_purge_after_authentication() {
    let users = Arc::new(InMemoryUserRepository::with_bcrypt_cost(4));
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let gateway = Arc::new(RecordingGateway::new());
    let user = UserRecord::new("jane@example.com", "+1", "4155552671");
    users.add_user(user.clone(), PASSWORD).await.unwrap();

    // Older leftover token of the same user
    tokens
        .create(&VerificationToken::with_code(user.id, "9999"))
        .await
        .unwrap();

    let service = TwoFactorService::new(
        TwoFactorCollaborators {
            credentials: users.clone(),
            users: users.clone(),
            tokens: tokens.clone(),
            gateway: gateway.clone(),
            guard: Arc::new(SessionAuthGuard),
        },
        TwoFactorServiceConfig::default(),
    )
    .with_listener(Arc::new(TokenPurgeListener::new(tokens.clone())));

    let ctx = RequestContext::new("jane@example.com", "127.0.0.1");
    let mut session = SessionData::new();
    service
        .login(
            &ctx,
            &LoginCredentials::new("jane@example.com", PASSWORD, false),
            &mut session,
        )
        .await
        .unwrap();
    assert_eq!(tokens.len().await, 2);

    let code = gateway.last_code().unwrap();
    service.submit_code(&ctx, &code, &mut session).await.unwrap();

    assert!(tokens.find_by_user_id(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_handle_authenticated_notifies_listeners() {
    let fixture = Fixture::new().await;
    let user_id = Uuid::new_v4();

    fixture.service.handle_authenticated(user_id).await;

    assert_eq!(*fixture.listener.users.lock().unwrap(), vec![user_id]);
}

#[tokio::test]
async fn test_token_store_failure_is_fatal() {
    let users = Arc::new(InMemoryUserRepository::with_bcrypt_cost(4));
    let user = UserRecord::new("jane@example.com", "+1", "4155552671");
    users.add_user(user, PASSWORD).await.unwrap();
    let gateway = Arc::new(RecordingGateway::new());

    let service = TwoFactorService::new(
        TwoFactorCollaborators {
            credentials: users.clone(),
            users,
            tokens: Arc::new(FailingTokenRepository::default()),
            gateway: gateway.clone(),
            guard: Arc::new(SessionAuthGuard),
        },
        TwoFactorServiceConfig::default(),
    );

    let mut session = SessionData::new();
    let result = service
        .login(
            &RequestContext::new("jane@example.com", "127.0.0.1"),
            &LoginCredentials::new("jane@example.com", PASSWORD, false),
            &mut session,
        )
        .await;

    assert!(matches!(result, Err(DomainError::Persistence { .. })));
    assert!(gateway.messages().is_empty());
    assert!(!PendingLogin::is_present(&session));
}

#[tokio::test]
async fn test_user_lookup_failure_discards_token() {
    let users = Arc::new(InMemoryUserRepository::with_bcrypt_cost(4));
    let user = UserRecord::new("jane@example.com", "+1", "4155552671");
    let user_id = user.id;
    users.add_user(user, PASSWORD).await.unwrap();
    let tokens = Arc::new(InMemoryTokenRepository::new());
    let gateway = Arc::new(RecordingGateway::new());

    let service = TwoFactorService::new(
        TwoFactorCollaborators {
            credentials: users,
            users: Arc::new(FailingUserLookup),
            tokens: tokens.clone(),
            gateway: gateway.clone(),
            guard: Arc::new(SessionAuthGuard),
        },
        TwoFactorServiceConfig::default(),
    );

    let mut session = SessionData::new();
    let result = service
        .login(
            &RequestContext::new("jane@example.com", "127.0.0.1"),
            &LoginCredentials::new("jane@example.com", PASSWORD, false),
            &mut session,
        )
        .await;

    assert!(matches!(result, Err(DomainError::Persistence { .. })));
    assert!(tokens.find_by_user_id(user_id).await.unwrap().is_empty());
    assert!(gateway.messages().is_empty());
    assert!(!PendingLogin::is_present(&session));
}
