#![allow(unused)]
use actix_web::{
    body,
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use deadpool_redis::{redis::RedisError, CreatePoolError, PoolError};
use serde_json::json;
use std::borrow::Cow;

use crate::ENV;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Service Unavailable")]
    ServiceUnavailable,
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal_server_error() -> Self {
        Self::InternalServer
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let header = ("Access-Control-Allow-Origin", ENV.frontend_url.as_str());
        let mut res = HttpResponse::build(self.status_code());

        res.insert_header(header);
        res.insert_header(("Access-Control-Allow-Credentials", "true"));

        match self {
            // Has Message
            Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::BadRequest(msg)
            | Error::Forbidden(msg) => res.json(ErrorBody { message: msg.clone() }),
            // No Message
            Error::ServiceUnavailable => res.json(ErrorBody {
                message: "Service temporarily unavailable, please retry".into(),
            }),
            Error::InternalServer => {
                res.json(ErrorBody { message: "Internal Server Error".into() })
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // jwt errors
    #[error("JWT Error")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // redis errors
    #[error(transparent)]
    PoolInit(#[from] CreatePoolError),
    #[error("Redis pool error: {0}")]
    PoolGet(#[from] PoolError),
    #[error("Redis error")]
    RedisError(#[from] RedisError),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Database Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Database Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    #[error("State Conflict: {0}")]
    StateConflict(Cow<'static, str>),
    #[error("Storage unavailable after retry")]
    ServiceUnavailable,
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };

    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };

    match constraint.as_str() {
        "uniq_active_session" => {
            "You already have an active consultation request with this doctor".into()
        }
        "consult_sessions_room_id_key" => "Room already exists".into(),
        "conversations_appointment_id_key" => "Conversation already exists".into(),
        _ => {
            let field = constraint.split('_').next_back().unwrap_or("value");

            let mut chars = field.chars();
            let field = match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Value".to_string(),
            };

            format!("{field} already exists").into()
        }
    }
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::Unauthorized(msg) => Error::Unauthorized(msg),
            SystemError::Forbidden(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            SystemError::StateConflict(msg) => Error::Conflict(msg),
            SystemError::ServiceUnavailable => Error::ServiceUnavailable,
            SystemError::JwtError(_) => Error::Unauthorized("Token Invalid or Expired".into()),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

/// Connection-level sqlx failures worth one retry before giving up.
pub fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("{:?}", err);
        if is_transient(&err) {
            return SystemError::ServiceUnavailable;
        }
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return SystemError::Conflict(Some(DbErrorMeta {
                        code: db_err.code().map(|s| s.to_string()),
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        message: db_err.message().to_string(),
                    }));
                }
                Some("42P01") => {
                    return SystemError::NotFound("Resource not found".into());
                }
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    return SystemError::DatabaseError(db_err.message().to_string().into());
                }
            }
        }
        SystemError::InternalError(Box::new(err))
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn state_conflict(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::StateConflict(msg.into())
    }

    /// Client-facing text for channel error frames. Validation and state
    /// failures keep their specific message; storage and internal failures
    /// get generic text, matching what the HTTP responder exposes.
    pub fn client_message(&self) -> Cow<'static, str> {
        match self {
            SystemError::BadRequest(msg)
            | SystemError::Unauthorized(msg)
            | SystemError::Forbidden(msg)
            | SystemError::NotFound(msg)
            | SystemError::StateConflict(msg) => msg.clone(),
            SystemError::Conflict(meta) => conflict_message(meta),
            SystemError::ServiceUnavailable => {
                "Service temporarily unavailable, please retry".into()
            }
            _ => "Something went wrong. Please try again.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_active_session_constraint_maps_to_actionable_message() {
        let meta = Some(DbErrorMeta {
            code: Some("23505".to_string()),
            constraint: Some("uniq_active_session".to_string()),
            message: "duplicate key value violates unique constraint".to_string(),
        });
        let err: Error = SystemError::Conflict(meta).into();
        match err {
            Error::Conflict(msg) => assert!(msg.contains("already have an active consultation")),
            _ => panic!("Expected Conflict"),
        }
    }

    #[test]
    fn state_conflict_keeps_specific_message() {
        let err: Error = SystemError::state_conflict("Session is no longer pending").into();
        match err {
            Error::Conflict(msg) => assert_eq!(msg, "Session is no longer pending"),
            _ => panic!("Expected Conflict"),
        }
    }

    #[test]
    fn forbidden_passes_through() {
        let err: Error = SystemError::forbidden("Access denied").into();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn client_message_keeps_validation_and_state_text() {
        assert_eq!(
            SystemError::bad_request("Attachment is too large").client_message(),
            "Attachment is too large"
        );
        assert_eq!(
            SystemError::state_conflict("Session is no longer pending").client_message(),
            "Session is no longer pending"
        );
    }

    #[test]
    fn client_message_hides_internal_detail() {
        let err = SystemError::DatabaseError("relation does not exist".into());
        assert!(!err.client_message().contains("relation"));

        assert_eq!(
            SystemError::ServiceUnavailable.client_message(),
            "Service temporarily unavailable, please retry"
        );
    }
}
