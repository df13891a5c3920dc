/// User lifecycle hooks
///
/// The user manager calls these after each account event. Implementations
/// decide what to do with them (send an email, enqueue a webhook); every
/// method defaults to a no-op so an implementation overrides only what it
/// needs.
///
/// Tokens passed to `on_after_forgot_password` and `on_after_request_verify`
/// are the only copy; delivering them is the hook's job.

use async_trait::async_trait;
use tracing::info;

use crate::models::user::User;

#[async_trait]
pub trait UserHooks: Send + Sync {
    async fn on_after_register(&self, _user: &User) {}

    async fn on_after_forgot_password(&self, _user: &User, _token: &str) {}

    async fn on_after_request_verify(&self, _user: &User, _token: &str) {}

    async fn on_after_reset_password(&self, _user: &User) {}

    async fn on_after_verify(&self, _user: &User) {}
}

/// Records every event through `tracing`
///
/// Tokens are never written to the log, at any level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks;

#[async_trait]
impl UserHooks for LoggingHooks {
    async fn on_after_register(&self, user: &User) {
        info!(user_id = %user.id, "User has registered");
    }

    async fn on_after_forgot_password(&self, user: &User, _token: &str) {
        info!(user_id = %user.id, "User has forgot their password");
    }

    async fn on_after_request_verify(&self, user: &User, _token: &str) {
        info!(user_id = %user.id, "Verification requested");
    }

    async fn on_after_reset_password(&self, user: &User) {
        info!(user_id = %user.id, "User has reset their password");
    }

    async fn on_after_verify(&self, user: &User) {
        info!(user_id = %user.id, "User has been verified");
    }
}
