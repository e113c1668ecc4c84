use serde::{Deserialize, Serialize};

use crate::backend::Table;

/// Errors produced by the mock backend and the feature modules built on it.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Carries the message the UI shows verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Table {table} does not hold {record} records")]
    TableMismatch { table: Table, record: &'static str },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Machine-readable error category carried in an [`ErrorBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    InvalidCredentials,
    NotAuthenticated,
    Unexpected,
}

/// The `error` half of a `{data, error}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&BackendError> for ErrorBody {
    fn from(err: &BackendError) -> Self {
        let code = match err {
            BackendError::NotFound(_) => ErrorCode::NotFound,
            BackendError::Validation(_) => ErrorCode::Validation,
            BackendError::InvalidCredentials => ErrorCode::InvalidCredentials,
            BackendError::NotAuthenticated => ErrorCode::NotAuthenticated,
            BackendError::TableMismatch { .. }
            | BackendError::Serialization(_)
            | BackendError::Other(_) => ErrorCode::Unexpected,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

impl From<ErrorBody> for BackendError {
    fn from(body: ErrorBody) -> Self {
        match body.code {
            ErrorCode::NotFound => BackendError::NotFound(body.message),
            ErrorCode::Validation => BackendError::Validation(body.message),
            ErrorCode::InvalidCredentials => BackendError::InvalidCredentials,
            ErrorCode::NotAuthenticated => BackendError::NotAuthenticated,
            ErrorCode::Unexpected => BackendError::Other(anyhow::anyhow!(body.message)),
        }
    }
}

/// Result envelope returned by every shim call.
///
/// Mirrors the remote API: exactly one of `data` and `error` is set, and a
/// missing record is reported through `error` rather than as a failure of
/// the call itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(err: &BackendError) -> Self {
        Self {
            data: None,
            error: Some(err.into()),
        }
    }

    pub fn from_result(result: BackendResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(&e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> BackendResult<T> {
        match (self.data, self.error) {
            (_, Some(body)) => Err(body.into()),
            (Some(data), None) => Ok(data),
            (None, None) => Err(BackendError::Other(anyhow::anyhow!(
                "response carried neither data nor error"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_travels_as_error_body() {
        let response: Response<u32> = Response::err(&BackendError::NotFound("products".into()));
        assert!(response.data.is_none());
        let body = response.error.clone().unwrap();
        assert_eq!(body.code, ErrorCode::NotFound);
        assert!(matches!(response.into_result(), Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = BackendError::Validation("El mensaje no puede estar vacío".into());
        assert_eq!(err.to_string(), "El mensaje no puede estar vacío");
    }

    #[test]
    fn test_ok_round_trips_into_result() {
        let response = Response::ok(7);
        assert!(response.is_ok());
        assert_eq!(response.into_result().unwrap(), 7);
    }
}
