//! Signed token encoding and decoding

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use tracing::debug;

use crate::domain::entities::token::{TokenClaims, TokenKind, CLAIMS_VERSION};
use crate::errors::{DomainError, TokenError};

use super::key_provider::KeyProvider;

/// Encodes and decodes access and refresh tokens
///
/// Decoding verifies the signature, issuer, audience and claim schema. It
/// never judges expiry or rotation state; callers do that against their
/// own clock and store.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: KeyProvider,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(keys: KeyProvider, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            keys,
            issuer,
            audience,
            validation,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Signs `claims` with the private key
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Compact JWS
    /// * `Err(DomainError)` - Claims are not well-formed for their kind, or signing failed
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, DomainError> {
        if let Err(reason) = check_schema(claims) {
            debug!(reason, kind = %claims.kind, "Refusing to encode malformed claims");
            return Err(TokenError::TokenGenerationFailed.into());
        }

        let mut header = Header::new(self.keys.algorithm());
        header.kid = self.keys.key_id().map(str::to_string);

        encode(&header, claims, self.keys.encoding_key())
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Verifies `token` and returns its claims
    ///
    /// # Returns
    ///
    /// * `Ok(TokenClaims)` - Signature valid and claims well-formed (possibly expired)
    /// * `Err(DomainError)` - `BadSignature` or `MalformedToken`
    pub fn decode(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let data = decode::<TokenClaims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    DomainError::Token(TokenError::BadSignature)
                }
                _ => DomainError::Token(TokenError::MalformedToken),
            })?;

        check_schema(&data.claims).map_err(|reason| {
            debug!(reason, "Decoded token failed schema check");
            DomainError::Token(TokenError::MalformedToken)
        })?;

        Ok(data.claims)
    }
}

fn check_schema(claims: &TokenClaims) -> Result<(), &'static str> {
    if claims.ver != CLAIMS_VERSION {
        return Err("unsupported schema version");
    }
    if claims.sub.trim().is_empty() {
        return Err("empty subject");
    }
    match claims.kind {
        TokenKind::Access if claims.rid.is_some() => Err("access token carries a refresh id"),
        TokenKind::Refresh if claims.rid.as_deref().map_or(true, str::is_empty) => {
            Err("refresh token without refresh id")
        }
        TokenKind::Refresh if claims.attrs.is_some() => {
            Err("refresh token carries identity attributes")
        }
        _ => Ok(()),
    }
}
