use tracing::warn;

use crate::domain::entities::{TelegramUser, VerifiedInitData};
use crate::domain::errors::AuthError;
use crate::domain::ports::{Clock, SessionIssuer, UserProfileStore};
use crate::use_cases::verify_init_data::InitDataVerifier;

// Response returned by the Telegram login use case.
pub struct TelegramLoginResponse {
    pub token: String,
    pub expires_at: u64,
    pub user: TelegramUser,
    pub auth_date: i64,
    pub query_id: Option<String>,
}

// Telegram login use case with injected dependencies.
pub struct TelegramLoginUseCase<'a, C, P, S: ?Sized> {
    pub clock: C,
    pub verifier: &'a InitDataVerifier,
    pub profiles: P,
    pub sessions: &'a S,
}

impl<C, P, S> TelegramLoginUseCase<'_, C, P, S>
where
    C: Clock,
    P: UserProfileStore,
    S: SessionIssuer + ?Sized,
{
    pub async fn execute(&self, init_data: &str) -> Result<TelegramLoginResponse, AuthError> {
        // One clock reading covers both the age check and the session expiry.
        let now = self.clock.now_epoch_seconds();
        let VerifiedInitData {
            user,
            auth_date,
            query_id,
        } = self.verifier.verify_at(init_data, now)?;

        // Best-effort persistence of the profile; login still succeeds without it.
        if let Err(err) = self.profiles.upsert_telegram_user(&user).await {
            warn!(error = %err, user_id = user.id, "failed to upsert telegram profile");
        }

        let session = self
            .sessions
            .issue(&user.id.to_string(), now)
            .map_err(|err| {
                warn!(error = %err, user_id = user.id, "failed to issue session");
                AuthError::SessionIssueFailure
            })?;

        Ok(TelegramLoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user,
            auth_date,
            query_id,
        })
    }
}
