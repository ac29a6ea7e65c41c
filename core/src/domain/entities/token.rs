//! Token entities for asymmetric JWT sessions and refresh rotation.

use chrono::{DateTime, Utc};
use rotor_shared::RefreshCookieConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Claim schema version written into every token
pub const CLAIMS_VERSION: u32 = 1;

/// The two token kinds minted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential carrying identity attributes
    Access,
    /// Long-lived credential used only to obtain a new session
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Opaque principal identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity attributes copied into access tokens
///
/// Read from the user directory at issuance and at every rotation; never
/// carried over from a previous token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityAttributes {
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role used by the authorization layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Any further attributes, kept under their own `ext` object so no key
    /// can shadow `email` or `role`
    #[serde(rename = "ext", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl IdentityAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.role.is_none() && self.extra.is_empty()
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Schema version
    pub ver: u32,

    /// Subject (principal id)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Access or refresh
    pub kind: TokenKind,

    /// Refresh identifier, present only on refresh tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,

    /// Identity attributes, present only on access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<IdentityAttributes>,
}

impl TokenClaims {
    /// Creates claims for an access token
    ///
    /// # Arguments
    ///
    /// * `subject` - The principal the token is issued to
    /// * `attributes` - Identity attributes; omitted from the payload when empty
    /// * `issued_at` - Unix seconds
    /// * `ttl_seconds` - Lifetime of the token
    pub fn new_access(
        subject: &SubjectId,
        attributes: &IdentityAttributes,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            ver: CLAIMS_VERSION,
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
            iss: String::new(),
            aud: String::new(),
            kind: TokenKind::Access,
            rid: None,
            attrs: (!attributes.is_empty()).then(|| attributes.clone()),
        }
    }

    /// Creates claims for a refresh token bound to `refresh_id`
    pub fn new_refresh(
        subject: &SubjectId,
        refresh_id: impl Into<String>,
        issued_at: i64,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            ver: CLAIMS_VERSION,
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
            iss: String::new(),
            aud: String::new(),
            kind: TokenKind::Refresh,
            rid: Some(refresh_id.into()),
            attrs: None,
        }
    }

    /// Stamps issuer and audience
    pub fn issued_by(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.iss = issuer.into();
        self.aud = audience.into();
        self
    }

    pub fn subject_id(&self) -> SubjectId {
        SubjectId::new(self.sub.clone())
    }

    pub fn refresh_id(&self) -> Option<&str> {
        self.rid.as_deref()
    }

    /// A token is expired once `now` reaches `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// The single current refresh identifier of a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRecord {
    pub subject_id: SubjectId,
    pub current_refresh_id: String,
    pub updated_at: DateTime<Utc>,
}

impl RotationRecord {
    pub fn new(
        subject_id: SubjectId,
        current_refresh_id: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id,
            current_refresh_id: current_refresh_id.into(),
            updated_at,
        }
    }

    pub fn is_current(&self, refresh_id: &str) -> bool {
        self.current_refresh_id == refresh_id
    }
}

/// Where a refresh token stands relative to its subject's rotation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenState {
    /// The token's id is the subject's current refresh id
    Current,
    /// The subject has a record, but with a different id
    Superseded,
    /// The subject has no record
    Unknown,
}

/// Transport instructions for delivering the refresh token as a cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshCookie {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    /// Seconds, equal to the refresh token lifetime
    pub max_age: i64,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
}

impl RefreshCookie {
    pub fn from_config(config: &RefreshCookieConfig, max_age: i64) -> Self {
        Self {
            name: config.name.clone(),
            path: config.path.clone(),
            domain: config.domain.clone(),
            max_age,
            secure: config.secure,
            http_only: config.http_only,
            same_site: config.same_site.clone(),
        }
    }

    /// Renders a `Set-Cookie` header value carrying `value`
    pub fn header_value(&self, value: &str) -> String {
        self.render(value, self.max_age)
    }

    /// Renders a `Set-Cookie` header value that removes the cookie
    pub fn clear_header_value(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut header = format!("{}={}; Path={}; Max-Age={}", self.name, value, self.path, max_age);
        if let Some(domain) = &self.domain {
            header.push_str("; Domain=");
            header.push_str(domain);
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str("; SameSite=");
        header.push_str(&self.same_site);
        header
    }
}

/// Tokens returned to the client after issuance or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,

    /// How the refresh token should be delivered
    pub refresh_cookie: RefreshCookie,
}

impl Session {
    /// `Set-Cookie` header value for this session's refresh token
    pub fn refresh_cookie_header(&self) -> String {
        self.refresh_cookie.header_value(&self.refresh_token)
    }
}
