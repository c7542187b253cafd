use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{log, Level};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid vote type: {0} (expected 1 or -1)")]
    InvalidVoteType(i16),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("a comment must target exactly one of a leader or an agenda")]
    InvalidCommentTarget,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidVoteType(_) | Error::Validation(_) | Error::InvalidCommentTarget => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::Store(e) = self {
            log!(Level::Error, "store error: {e}");
        }
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        assert_eq!(
            Error::InvalidVoteType(0).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidCommentTarget.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Validation("comment body must be 1-1000 characters".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn absent_targets_map_to_not_found() {
        assert_eq!(Error::NotFound("leader").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failures_map_to_service_unavailable() {
        assert_eq!(
            Error::Store(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
