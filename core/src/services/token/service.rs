//! Main token service implementation

use std::future::Future;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{
    IdentityAttributes, RefreshCookie, RefreshTokenState, Session, SubjectId, TokenClaims,
    TokenKind,
};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{IdentityDirectory, RotationStore};

use super::clock::{Clock, SystemClock};
use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::key_provider::KeyProvider;

/// Random bytes behind each refresh identifier
const REFRESH_ID_BYTES: usize = 32;

/// Issues sessions, validates access tokens and rotates refresh tokens
///
/// Holds no mutable state of its own. Concurrent rotations of one subject
/// are arbitrated by the rotation store's compare-and-advance.
pub struct TokenService {
    codec: TokenCodec,
    store: Arc<dyn RotationStore>,
    directory: Arc<dyn IdentityDirectory>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `keys` - Loaded signing keypair
    /// * `store` - Rotation store holding the current refresh id per subject
    /// * `directory` - Source of identity attributes at rotation time
    /// * `config` - Token lifetimes, issuer, audience, cookie and timeout settings
    pub fn new(
        keys: KeyProvider,
        store: Arc<dyn RotationStore>,
        directory: Arc<dyn IdentityDirectory>,
        config: TokenServiceConfig,
    ) -> Self {
        let codec = TokenCodec::new(keys, config.issuer.clone(), config.audience.clone());

        Self {
            codec,
            store,
            directory,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Starts a new session for an authenticated subject
    ///
    /// Any previous refresh chain of the subject is replaced.
    ///
    /// # Arguments
    ///
    /// * `subject_id` - The authenticated principal
    /// * `attributes` - Identity attributes to carry in the access token
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - Both tokens plus refresh cookie instructions
    /// * `Err(DomainError)` - Token generation failed or the store is unavailable
    pub async fn issue_session(
        &self,
        subject_id: &SubjectId,
        attributes: &IdentityAttributes,
    ) -> DomainResult<Session> {
        let refresh_id = generate_refresh_id();
        let session = self.mint_session(subject_id, attributes, &refresh_id)?;

        self.bounded("put", self.store.put(subject_id, &refresh_id))
            .await
            .map_err(store_failure)?;

        info!(subject_id = %subject_id, "Session issued");
        Ok(session)
    }

    /// Checks an access token without touching any store
    ///
    /// # Returns
    ///
    /// * `Ok(TokenClaims)` - Signed, unexpired access token
    /// * `Err(DomainError)` - Always `AuthError::Unauthenticated`; the
    ///   specific reason is logged at debug level
    pub fn validate_access_token(&self, token: &str) -> DomainResult<TokenClaims> {
        self.decode_checked(token, TokenKind::Access, true)
            .map_err(|e| unauthenticated("validate_access_token", e))
    }

    /// Exchanges a current refresh token for a new session
    ///
    /// Identity attributes are re-read from the directory, never taken
    /// from the presented token. If the lookup fails after the store has
    /// advanced, the presented token is already superseded and the client
    /// must authenticate again.
    ///
    /// # Returns
    ///
    /// * `Ok(Session)` - New token pair; the presented token is now superseded
    /// * `Err(DomainError)` - `Unauthenticated`, `RefreshReuseDetected`,
    ///   `StoreUnavailable` or `IdentityLookupFailed`
    pub async fn rotate_refresh_token(&self, token: &str) -> DomainResult<Session> {
        let claims = self
            .decode_checked(token, TokenKind::Refresh, true)
            .map_err(|e| unauthenticated("rotate_refresh_token", e))?;

        let subject_id = claims.subject_id();
        let presented = claims
            .refresh_id()
            .ok_or(DomainError::Auth(AuthError::Unauthenticated))?;
        let next = generate_refresh_id();

        let advanced = self
            .bounded(
                "compare_and_advance",
                self.store.compare_and_advance(&subject_id, presented, &next),
            )
            .await
            .map_err(store_failure)?;

        if !advanced {
            warn!(subject_id = %subject_id, "Refresh token reuse detected");
            return Err(AuthError::RefreshReuseDetected.into());
        }

        let attributes = self.lookup_identity(&subject_id).await?;
        let session = self.mint_session(&subject_id, &attributes, &next)?;

        info!(subject_id = %subject_id, "Refresh token rotated");
        Ok(session)
    }

    /// Ends every refresh chain of a subject
    ///
    /// Access tokens already issued stay valid until they expire.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A session existed and was revoked
    /// * `Ok(false)` - The subject had no session
    pub async fn revoke_session(&self, subject_id: &SubjectId) -> DomainResult<bool> {
        let revoked = self
            .bounded("revoke", self.store.revoke(subject_id))
            .await
            .map_err(store_failure)?;

        info!(subject_id = %subject_id, revoked, "Session revoked");
        Ok(revoked)
    }

    /// Reports where a refresh token stands against the store
    ///
    /// Diagnostics only; rotation never consults this. Expiry is ignored,
    /// signature and kind are enforced.
    pub async fn classify_refresh_token(&self, token: &str) -> DomainResult<RefreshTokenState> {
        let claims = self
            .decode_checked(token, TokenKind::Refresh, false)
            .map_err(|e| unauthenticated("classify_refresh_token", e))?;

        let record = self
            .bounded("get", self.store.get(&claims.subject_id()))
            .await
            .map_err(store_failure)?;

        Ok(match (record, claims.refresh_id()) {
            (None, _) | (_, None) => RefreshTokenState::Unknown,
            (Some(record), Some(rid)) if record.is_current(rid) => RefreshTokenState::Current,
            (Some(_), Some(_)) => RefreshTokenState::Superseded,
        })
    }

    fn decode_checked(
        &self,
        token: &str,
        expected: TokenKind,
        check_expiry: bool,
    ) -> DomainResult<TokenClaims> {
        let claims = self.codec.decode(token)?;

        if claims.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: claims.kind,
            }
            .into());
        }
        if check_expiry && claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired.into());
        }

        Ok(claims)
    }

    fn mint_session(
        &self,
        subject_id: &SubjectId,
        attributes: &IdentityAttributes,
        refresh_id: &str,
    ) -> DomainResult<Session> {
        let issued_at = self.clock.now().timestamp();

        let access_claims =
            TokenClaims::new_access(subject_id, attributes, issued_at, self.config.access_token_ttl)
                .issued_by(self.codec.issuer(), self.codec.audience());
        let refresh_claims = TokenClaims::new_refresh(
            subject_id,
            refresh_id,
            issued_at,
            self.config.refresh_token_ttl,
        )
        .issued_by(self.codec.issuer(), self.codec.audience());

        Ok(Session {
            access_token: self.codec.encode(&access_claims)?,
            refresh_token: self.codec.encode(&refresh_claims)?,
            access_expires_in: self.config.access_token_ttl,
            refresh_expires_in: self.config.refresh_token_ttl,
            refresh_cookie: RefreshCookie::from_config(
                &self.config.cookie,
                self.config.refresh_token_ttl,
            ),
        })
    }

    async fn lookup_identity(&self, subject_id: &SubjectId) -> DomainResult<IdentityAttributes> {
        let found = self
            .bounded(
                "get_identity_attributes",
                self.directory.get_identity_attributes(subject_id),
            )
            .await
            .map_err(|e| match e {
                DomainError::Auth(AuthError::StoreUnavailable { .. }) => e,
                other => {
                    error!(subject_id = %subject_id, error = %other, "Identity lookup failed");
                    AuthError::IdentityLookupFailed {
                        message: other.to_string(),
                    }
                    .into()
                }
            })?;

        found.ok_or_else(|| {
            warn!(subject_id = %subject_id, "Subject missing from identity directory");
            AuthError::IdentityLookupFailed {
                message: format!("subject {} not found", subject_id),
            }
            .into()
        })
    }

    /// Runs a store or directory call under the configured timeout
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                error!(operation, timeout = ?self.config.store_timeout, "Store call timed out");
                Err(AuthError::StoreUnavailable {
                    message: format!("{} timed out", operation),
                }
                .into())
            }
        }
    }
}

/// Generates an unpredictable refresh identifier
pub(crate) fn generate_refresh_id() -> String {
    let bytes: [u8; REFRESH_ID_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn unauthenticated(operation: &'static str, reason: DomainError) -> DomainError {
    debug!(operation, reason = %reason, "Token rejected");
    AuthError::Unauthenticated.into()
}

fn store_failure(e: DomainError) -> DomainError {
    match e {
        DomainError::Auth(AuthError::StoreUnavailable { .. }) => {
            error!(error = %e, "Rotation store unavailable");
            e
        }
        other => {
            error!(error = %other, "Rotation store call failed");
            AuthError::StoreUnavailable {
                message: other.to_string(),
            }
            .into()
        }
    }
}
