//! Application-wide error types.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error(transparent)]
    Engine(#[from] reach_token::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        use reach_token::Error as E;
        match self {
            GatewayError::Engine(err) => match err {
                E::Unauthorized => StatusCode::FORBIDDEN,
                E::Paused => StatusCode::LOCKED,
                E::NotFound => StatusCode::NOT_FOUND,
                E::InvalidAmount | E::InsufficientPayment | E::SlippageExceeded => {
                    StatusCode::BAD_REQUEST
                }
                E::VotingClosed | E::VotingStillOpen | E::AlreadyVoted | E::AlreadyExecuted => {
                    StatusCode::CONFLICT
                }
                E::ArithmeticOverflow => StatusCode::UNPROCESSABLE_ENTITY,
            },
            GatewayError::Oracle(_) | GatewayError::Http(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
