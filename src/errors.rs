use crate::helpers::JsonResponse;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Everything that can go wrong while serving a rating request.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    /// Unknown product id
    #[error("Product {0} not found")]
    NotFound(i32),
    /// Product id already taken
    #[error("Product {0} already exists")]
    DuplicateId(i32),
    /// Value outside 1..=5 or not a number at all
    #[error("Invalid rating {0}, expected an integer between 1 and 5")]
    InvalidRating(String),
    /// Required admin field absent
    #[error("{0}")]
    MissingField(&'static str),
    #[error("The start of the time window is after its end")]
    InvalidWindow,
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized access")]
    Forbidden,
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl From<sqlx::Error> for RatingError {
    fn from(err: sqlx::Error) -> Self {
        Self::StorageFailure(err.to_string())
    }
}

impl ResponseError for RatingError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateId(_) => StatusCode::CONFLICT,
            Self::InvalidRating(_)
            | Self::MissingField(_)
            | Self::InvalidWindow
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            // 403 rather than 401 keeps browsers from popping up a login dialog
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            Self::Forbidden => {
                return HttpResponse::build(status).json(json!({
                    "message": "Unauthorized access",
                }));
            }
            Self::StorageFailure(details) => {
                tracing::error!("Storage failure: {}", details);
                "Failed!".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(
            JsonResponse::<serde_json::Value>::build()
                .set_msg(message)
                .error(status),
        )
    }
}
