use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{ValidateEmail, ValidationError};
use validator_derive::Validate;

use crate::shared::coerce_date;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTripDto {
  #[validate(length(min = 4, message = "Destination must have at least 4 characters"))]
  pub destination: String,
  #[serde(deserialize_with = "coerce_date::deserialize")]
  pub starts_at: DateTime<Utc>,
  #[serde(deserialize_with = "coerce_date::deserialize")]
  pub ends_at: DateTime<Utc>,
  pub owner_name: String,
  #[validate(email(message = "Invalid email format"))]
  pub owner_email: String,
  /// Absent means the trip is created without a participant list.
  #[validate(custom(function = "validate_emails_to_invite"))]
  pub emails_to_invite: Option<Vec<String>>,
}

#[allow(clippy::ptr_arg)]
fn validate_emails_to_invite(emails: &Vec<String>) -> Result<(), ValidationError> {
  if emails.iter().all(|email| email.validate_email()) {
    return Ok(());
  }
  Err(
    ValidationError::new("email")
      .with_message(Cow::from("Invalid email format in invite list")),
  )
}
