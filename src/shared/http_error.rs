use actix_web::{error, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
  pub message: String
}

impl From<&str> for HttpError {
  fn from(message: &str) -> Self {
    Self { message: String::from(message) }
  }
}

impl From<String> for HttpError {
  fn from(message: String) -> Self {
    Self { message }
  }
}

/// Turns body deserialization failures into a 400 with the usual error shape.
pub fn json_error_handler(
  err: error::JsonPayloadError,
  _request: &HttpRequest,
) -> actix_web::Error {
  let response = HttpResponse::BadRequest()
    .content_type("application/json")
    .json(HttpError::from(err.to_string()));
  error::InternalError::from_response(err, response).into()
}
