//! Todo store errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::response::fault_response;
use crate::observability::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("Todo with ID {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Unknown(String),
}

impl TodoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoError::NotFound(_) => ErrorKind::NotFound,
            TodoError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound(_))
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        fault_response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::HandlerFault;

    #[test]
    fn test_not_found_message_and_status() {
        let err = TodoError::NotFound("abc".into());
        assert_eq!(err.to_string(), "Todo with ID abc not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_response_carries_fault() {
        let response = TodoError::Unknown("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let fault = response.extensions().get::<HandlerFault>().unwrap();
        assert_eq!(fault.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(fault.message, "lock poisoned");
    }
}
