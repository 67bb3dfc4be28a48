use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::control::{ClientId, machine::ContextMissing};

/// Faults raised while a display controller handles a command.
///
/// Every variant is recovered the same way: the controller logs it and falls back to idle.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The requested module is not registered in the library.
    #[error("unknown module `{0}`")]
    UnknownModule(String),
    /// The display's writer channel is closed.
    #[error("display `{0}` is no longer connected")]
    ClientGone(ClientId),
    /// The controller task has stopped and no longer accepts commands.
    #[error("controller for display `{0}` has stopped")]
    ControllerStopped(ClientId),
    /// A transition was attempted before the context was installed.
    #[error(transparent)]
    ContextMissing(#[from] ContextMissing),
    /// An outbound frame could not be serialized.
    #[error("failed to encode display message: {0}")]
    Encode(#[from] serde_json::Error),
    /// Fault reported from outside the state machine (e.g. by the display itself).
    #[error("fault: {0}")]
    Fault(String),
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Controller rejected or could not receive the command.
    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Control(
                err @ (ControlError::ClientGone(_) | ControlError::ControllerStopped(_)),
            ) => AppError::NotFound(err.to_string()),
            ServiceError::Control(ControlError::UnknownModule(module)) => {
                AppError::NotFound(format!("module `{module}`"))
            }
            ServiceError::Control(err) => AppError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn stopped_controller_maps_to_not_found() {
        let err: AppError =
            ServiceError::from(ControlError::ControllerStopped(Uuid::nil())).into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: AppError = ServiceError::InvalidInput("empty module".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn encode_failure_is_a_control_fault() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ControlError::from(source);
        assert!(matches!(err, ControlError::Encode(_)));
        assert!(err.to_string().starts_with("failed to encode display message"));

        let err: AppError = ServiceError::from(err).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unexpected_fault_maps_to_internal() {
        let err: AppError = ServiceError::from(ControlError::Fault("boom".into())).into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
