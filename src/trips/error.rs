use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

use crate::shared::{http_error::HttpError, mailer::MailError};
use crate::trips::repository::trip_repository::TripRepositoryError;

// Date messages are returned to clients verbatim, spelling included.
#[derive(Debug, Error)]
pub enum TripError {
  #[error("Ivalid trip start date.")]
  InvalidStartDate,

  #[error("Ivalid trip end date.")]
  InvalidEndDate,

  #[error("Mail error: {0}")]
  Mail(#[from] MailError),

  #[error("Repository error: {0}")]
  Repository(#[from] TripRepositoryError),
}

impl ResponseError for TripError {
  fn status_code(&self) -> StatusCode {
    match self {
      TripError::InvalidStartDate | TripError::InvalidEndDate => {
        StatusCode::BAD_REQUEST
      }
      TripError::Mail(_) | TripError::Repository(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let body = if status.is_server_error() {
      error!("Failed to create trip: {}", self);
      HttpError::from("Internal server error")
    } else {
      HttpError::from(self.to_string())
    };
    HttpResponse::build(status)
      .content_type("application/json")
      .json(body)
  }
}
