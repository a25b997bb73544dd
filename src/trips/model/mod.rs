use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
  pub id: String,
  pub destination: String,
  pub starts_at: DateTime<Utc>,
  pub ends_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  /// Owner first, then invitees in request order. Empty when the trip was
  /// created without a participant list.
  pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
  pub id: String,
  pub trip_id: String,
  pub name: Option<String>,
  pub email: String,
  pub is_confirmed: bool,
  pub is_owner: bool,
}
