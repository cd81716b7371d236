//! Access decision for a single report request.
//!
//! Two paths grant access: a valid sharing token bound to the record, or a
//! session belonging to the record's owner or an administrator. Which path is
//! evaluated depends only on whether a token was supplied; a present token is
//! never backed up by the session.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::auth::token::{TokenError, TokenSigner};
use crate::errors::AppError;
use crate::models::prediction::PredictionRecord;
use crate::models::user::{Role, SessionIdentity};

/// How the caller asked for access.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessRequest {
    Token(String),
    Session(Option<SessionIdentity>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrantPath {
    SharedToken { expires_at: DateTime<Utc> },
    Session { user_id: String, role: Role },
}

/// Proof that the caller may read `record_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub record_id: String,
    pub path: GrantPath,
}

pub trait Authorize {
    fn authorize(&self, record: &PredictionRecord) -> Result<Grant, AppError>;
}

pub struct TokenAuthorizer<'a> {
    signer: &'a TokenSigner,
    token: &'a str,
    now: DateTime<Utc>,
}

impl<'a> TokenAuthorizer<'a> {
    pub fn new(signer: &'a TokenSigner, token: &'a str, now: DateTime<Utc>) -> Self {
        Self { signer, token, now }
    }
}

impl Authorize for TokenAuthorizer<'_> {
    fn authorize(&self, record: &PredictionRecord) -> Result<Grant, AppError> {
        let verified = self
            .signer
            .verify(self.token, self.now)
            .map_err(|e: TokenError| AppError::TokenInvalid(e.to_string()))?;

        if verified.prediction_id != record.id {
            return Err(AppError::AuthorizationDenied(format!(
                "token for {} presented for {}",
                verified.prediction_id, record.id
            )));
        }

        debug!(prediction_id = %record.id, "Access granted by sharing token");
        Ok(Grant {
            record_id: record.id.clone(),
            path: GrantPath::SharedToken {
                expires_at: verified.expires_at,
            },
        })
    }
}

pub struct SessionAuthorizer<'a> {
    session: Option<&'a SessionIdentity>,
}

impl<'a> SessionAuthorizer<'a> {
    pub fn new(session: Option<&'a SessionIdentity>) -> Self {
        Self { session }
    }
}

impl Authorize for SessionAuthorizer<'_> {
    fn authorize(&self, record: &PredictionRecord) -> Result<Grant, AppError> {
        let session = self.session.ok_or(AppError::AuthenticationRequired)?;

        let is_owner = session.id == record.user_id;
        if !is_owner && session.role != Role::Admin {
            return Err(AppError::AuthorizationDenied(format!(
                "user {} does not own {}",
                session.id, record.id
            )));
        }

        debug!(
            prediction_id = %record.id,
            user_id = %session.id,
            owner = is_owner,
            "Access granted by session"
        );
        Ok(Grant {
            record_id: record.id.clone(),
            path: GrantPath::Session {
                user_id: session.id.clone(),
                role: session.role.clone(),
            },
        })
    }
}

impl AccessRequest {
    /// Empty token strings count as absent.
    pub fn from_parts(token: Option<String>, session: Option<SessionIdentity>) -> Self {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => AccessRequest::Token(token),
            None => AccessRequest::Session(session),
        }
    }

    pub fn authorizer<'a>(
        &'a self,
        signer: &'a TokenSigner,
        now: DateTime<Utc>,
    ) -> Box<dyn Authorize + 'a> {
        match self {
            AccessRequest::Token(token) => Box::new(TokenAuthorizer::new(signer, token, now)),
            AccessRequest::Session(session) => Box::new(SessionAuthorizer::new(session.as_ref())),
        }
    }

    /// Decides whether this request may read `record`.
    pub fn authorize(
        &self,
        record: &PredictionRecord,
        signer: &TokenSigner,
        now: DateTime<Utc>,
    ) -> Result<Grant, AppError> {
        self.authorizer(signer, now).authorize(record)
    }
}
