//! Main second-factor flow implementation

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::VerificationToken;
use crate::domain::events::AuthenticatedEvent;
use crate::domain::session::{flash_error, take_flashed_errors, Session};
use crate::domain::value_objects::{
    DeliveryChannel, LoginCredentials, PendingLogin, RequestContext,
};
use crate::errors::{AuthError, DomainResult, ValidationError};
use crate::repositories::{CredentialVerifier, TokenRepository, UserLookup};
use crate::services::auth_guard::AuthGuard;
use crate::services::delivery::DeliveryGateway;
use crate::services::listeners::AuthenticatedListener;
use crate::services::throttle::{LockoutResponse, ThrottleGuard};

use super::config::TwoFactorServiceConfig;
use super::types::{CodeForm, CodeFormView, FlowOutcome, ResendResult};

/// Required collaborators of `TwoFactorService`
#[derive(Clone)]
pub struct TwoFactorCollaborators {
    pub credentials: Arc<dyn CredentialVerifier>,
    pub users: Arc<dyn UserLookup>,
    pub tokens: Arc<dyn TokenRepository>,
    pub gateway: Arc<dyn DeliveryGateway>,
    pub guard: Arc<dyn AuthGuard>,
}

/// Why a submitted code was rejected; logged, never shown
#[derive(Debug, Clone, Copy)]
enum Rejection {
    MalformedSession,
    TokenNotFound,
    UserNotFound,
    TokenInvalid,
    CodeMismatch,
    UserMismatch,
    AlreadyUsed,
}

/// Controller for the pending-login state machine
pub struct TwoFactorService {
    credentials: Arc<dyn CredentialVerifier>,
    users: Arc<dyn UserLookup>,
    tokens: Arc<dyn TokenRepository>,
    gateway: Arc<dyn DeliveryGateway>,
    guard: Arc<dyn AuthGuard>,
    throttle: Option<Arc<dyn ThrottleGuard>>,
    listeners: Vec<Arc<dyn AuthenticatedListener>>,
    config: TwoFactorServiceConfig,
}

impl TwoFactorService {
    pub fn new(collaborators: TwoFactorCollaborators, config: TwoFactorServiceConfig) -> Self {
        Self {
            credentials: collaborators.credentials,
            users: collaborators.users,
            tokens: collaborators.tokens,
            gateway: collaborators.gateway,
            guard: collaborators.guard,
            throttle: None,
            listeners: Vec::new(),
            config,
        }
    }

    /// Enable lockout after repeated failures
    pub fn with_throttle(mut self, throttle: Arc<dyn ThrottleGuard>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Register a listener for completed authentications
    pub fn with_listener(mut self, listener: Arc<dyn AuthenticatedListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn config(&self) -> &TwoFactorServiceConfig {
        &self.config
    }

    /// Accept primary credentials and start the second step
    ///
    /// Any pending login already in the session is abandoned. On success the
    /// new token is bound to the session and the client is sent to the code
    /// form. Rejected credentials and undeliverable codes send the client
    /// back to the login form with a flashed error and count as a failed
    /// attempt.
    ///
    /// # Errors
    ///
    /// * `DomainError::ValidationErr` - identifier or secret missing
    /// * `DomainError::Persistence` - the token could not be stored
    pub async fn login(
        &self,
        ctx: &RequestContext,
        credentials: &LoginCredentials,
        session: &mut dyn Session,
    ) -> DomainResult<FlowOutcome> {
        credentials.validate()?;
        PendingLogin::clear(session);

        if let Some(lockout) = self.check_lockout(ctx).await? {
            return Ok(FlowOutcome::Lockout(lockout));
        }

        let Some(user_id) = self
            .credentials
            .resolve(&credentials.identifier, &credentials.secret)
            .await?
        else {
            tracing::warn!(
                key = %ctx.throttle_key(),
                event = "credentials_rejected",
                "Primary credentials rejected"
            );
            self.record_failure(ctx).await?;
            return Ok(self.back_to_login(session, AuthError::InvalidCredentials));
        };

        let token =
            VerificationToken::create(self.tokens.as_ref(), user_id, self.config.code_length)
                .await?;
        let outcome = match token
            .send_code(
                self.users.as_ref(),
                self.gateway.as_ref(),
                &self.config.message_template,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    token_id = %token.id,
                    error = %e,
                    event = "login_aborted",
                    "Verification code could not be sent, token discarded"
                );
                self.tokens.delete_by_id(token.id).await?;
                return Err(e);
            }
        };

        if let Some(error) = outcome.failure() {
            self.tokens.delete_by_id(token.id).await?;
            self.record_failure(ctx).await?;
            tracing::warn!(
                user_id = %user_id,
                token_id = %token.id,
                outcome = ?outcome,
                event = "login_aborted",
                "Verification code not delivered, token discarded"
            );
            return Ok(self.back_to_login(session, error));
        }

        PendingLogin::new(token.id, user_id, credentials.remember).store(session);
        PendingLogin::store_identifier(session, &credentials.identifier);
        tracing::info!(
            user_id = %user_id,
            token_id = %token.id,
            event = "code_pending",
            "Credentials accepted, awaiting verification code"
        );

        Ok(FlowOutcome::Redirect {
            to: self.config.verification_path.clone(),
        })
    }

    /// Describe the code form, or send the client to login when nothing is pending
    pub fn show_code_form(&self, session: &mut dyn Session) -> CodeFormView {
        if PendingLogin::load(session).is_none() {
            return CodeFormView::Redirect {
                to: self.config.login_path.clone(),
            };
        }

        CodeFormView::Form(CodeForm {
            action: self.config.verification_path.clone(),
            resend_action: self.config.resend_path(),
            code_length: self.config.code_length,
            errors: take_flashed_errors(session),
        })
    }

    /// Validate a submitted code and finish the login
    ///
    /// Checks run in a fixed order; every token-level failure is reported as
    /// the same `AuthError::InvalidToken` and keeps the pending state so the
    /// user can retry. The code is compared exactly as submitted.
    ///
    /// # Errors
    ///
    /// * `DomainError::ValidationErr` - empty code
    pub async fn submit_code(
        &self,
        ctx: &RequestContext,
        code: &str,
        session: &mut dyn Session,
    ) -> DomainResult<FlowOutcome> {
        if !PendingLogin::is_present(session) {
            return Ok(FlowOutcome::Redirect {
                to: self.config.login_path.clone(),
            });
        }

        if code.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "code".to_string(),
            }
            .into());
        }

        if let Some(lockout) = self.check_lockout(ctx).await? {
            return Ok(FlowOutcome::Lockout(lockout));
        }

        let pending = match PendingLogin::load(session) {
            Some(pending) => pending,
            None => return self.reject(ctx, session, Rejection::MalformedSession).await,
        };

        let token = match self.verify_pending(&pending, code).await? {
            Ok(token) => token,
            Err(rejection) => return self.reject(ctx, session, rejection).await,
        };

        if !self.tokens.mark_used(token.id).await? {
            return self.reject(ctx, session, Rejection::AlreadyUsed).await;
        }

        let login_identifier = PendingLogin::identifier(session);
        self.guard
            .login(session, pending.user_id, pending.remember)
            .await?;
        PendingLogin::clear(session);
        if let Some(throttle) = &self.throttle {
            throttle.clear_attempts(ctx).await?;
            // Password failures recorded before the code step
            if let Some(identifier) = login_identifier {
                throttle
                    .clear_attempts(&RequestContext::new(identifier, ctx.ip.clone()))
                    .await?;
            }
        }

        tracing::info!(
            user_id = %pending.user_id,
            token_id = %token.id,
            remember = pending.remember,
            event = "second_factor_verified",
            "Verification code accepted, user authenticated"
        );

        self.notify_authenticated(pending.user_id).await;

        Ok(FlowOutcome::Redirect {
            to: self.config.redirect_to.clone(),
        })
    }

    /// Send the outstanding code again
    ///
    /// Reuses the existing token: no new code is generated and the expiry
    /// clock keeps running.
    pub async fn resend_code(
        &self,
        session: &dyn Session,
        channel: DeliveryChannel,
    ) -> DomainResult<ResendResult> {
        let Some(pending) = PendingLogin::load(session) else {
            return Ok(ResendResult::failed("There is no pending login to resend a code for."));
        };

        let token = match self.tokens.find_by_id(pending.token_id).await? {
            Some(token) if token.user_id == pending.user_id => token,
            _ => {
                tracing::warn!(
                    token_id = %pending.token_id,
                    event = "resend_token_missing",
                    "Resend requested for unknown token"
                );
                return Ok(ResendResult::failed("Verification token not found."));
            }
        };

        if !token.is_valid() {
            return Ok(ResendResult::failed(
                "The verification code has expired. Please log in again.",
            ));
        }

        let outcome = token
            .send_code_via(
                channel,
                self.users.as_ref(),
                self.gateway.as_ref(),
                &self.config.message_template,
            )
            .await?;

        match outcome.failure() {
            None => Ok(ResendResult::sent()),
            Some(error) => Ok(ResendResult::failed(error.to_string())),
        }
    }

    /// Notify listeners of an authentication that happened outside this flow
    pub async fn handle_authenticated(&self, user_id: Uuid) {
        self.notify_authenticated(user_id).await;
    }

    async fn verify_pending(
        &self,
        pending: &PendingLogin,
        code: &str,
    ) -> DomainResult<Result<VerificationToken, Rejection>> {
        let Some(token) = self.tokens.find_by_id(pending.token_id).await? else {
            return Ok(Err(Rejection::TokenNotFound));
        };

        if self.users.find_user(token.user_id).await?.is_none() {
            return Ok(Err(Rejection::UserNotFound));
        }

        if !token.is_valid() {
            return Ok(Err(Rejection::TokenInvalid));
        }

        if !token.matches(code) {
            return Ok(Err(Rejection::CodeMismatch));
        }

        if token.user_id != pending.user_id {
            return Ok(Err(Rejection::UserMismatch));
        }

        Ok(Ok(token))
    }

    async fn reject(
        &self,
        ctx: &RequestContext,
        session: &mut dyn Session,
        reason: Rejection,
    ) -> DomainResult<FlowOutcome> {
        tracing::warn!(
            key = %ctx.throttle_key(),
            reason = ?reason,
            event = "code_rejected",
            "Verification code rejected"
        );
        self.record_failure(ctx).await?;

        let error = AuthError::InvalidToken;
        flash_error(session, error.to_string());
        Ok(FlowOutcome::RedirectWithError {
            to: self.config.verification_path.clone(),
            error,
        })
    }

    fn back_to_login(&self, session: &mut dyn Session, error: AuthError) -> FlowOutcome {
        flash_error(session, error.to_string());
        FlowOutcome::RedirectWithError {
            to: self.config.login_path.clone(),
            error,
        }
    }

    async fn check_lockout(&self, ctx: &RequestContext) -> DomainResult<Option<LockoutResponse>> {
        let Some(throttle) = &self.throttle else {
            return Ok(None);
        };

        if !throttle.too_many_attempts(ctx).await? {
            return Ok(None);
        }

        let lockout = throttle.lockout_response(ctx).await?;
        tracing::warn!(
            key = %ctx.throttle_key(),
            retry_after = lockout.retry_after_seconds,
            event = "login_locked_out",
            "Too many failed attempts"
        );
        Ok(Some(lockout))
    }

    async fn record_failure(&self, ctx: &RequestContext) -> DomainResult<()> {
        match &self.throttle {
            Some(throttle) => throttle.record_failed_attempt(ctx).await,
            None => Ok(()),
        }
    }

    async fn notify_authenticated(&self, user_id: Uuid) {
        let event = AuthenticatedEvent::new(user_id);
        for listener in &self.listeners {
            listener.handle(&event).await;
        }
    }
}
