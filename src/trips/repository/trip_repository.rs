use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder};
use thiserror::Error;

use crate::shared::database::Database;
use crate::trips::model::{Participant, Trip};

const PARTICIPANT_COLUMNS: usize = 6;

// Postgres accepts at most u16::MAX bind parameters per statement.
const MAX_PARTICIPANTS_PER_INSERT: usize = u16::MAX as usize / PARTICIPANT_COLUMNS;

#[derive(Debug, Error)]
pub enum TripRepositoryError {
  #[error("Database error: {0}")]
  DatabaseError(#[from] sqlx::Error),

  #[error("Other error: {0}")]
  Other(String),
}

pub trait TripRepository {
  /// Inserts the trip and its participants as one unit: either all rows are
  /// written or none are.
  async fn create(
    &self,
    create_trip: CreateTrip,
  ) -> Result<Trip, TripRepositoryError>;
}

pub struct TripRepositoryImpl {
  pool: Arc<Pool<Postgres>>,
}

impl TripRepositoryImpl {
  pub fn new(database: Arc<Database>) -> Self {
    Self {
      pool: database.pool.clone(),
    }
  }
}

impl TripRepository for TripRepositoryImpl {
  async fn create(
    &self,
    create_trip: CreateTrip,
  ) -> Result<Trip, TripRepositoryError> {
    let query = r#"
      INSERT INTO trips (id, destination, starts_at, ends_at)
      VALUES ($1, $2, $3, $4)
      RETURNING id, destination, starts_at, ends_at, created_at
    "#;

    let mut transaction = self.pool.begin().await?;

    let mut trip = sqlx::query(query)
      .bind(&create_trip.id)
      .bind(&create_trip.destination)
      .bind(create_trip.starts_at)
      .bind(create_trip.ends_at)
      .map(|row: PgRow| Trip::from(row))
      .fetch_one(&mut *transaction)
      .await?;

    for batch in create_trip.participants.chunks(MAX_PARTICIPANTS_PER_INSERT) {
      let participants = participants_insert(&trip.id, batch)
        .build()
        .map(|row: PgRow| Participant::from(row))
        .fetch_all(&mut *transaction)
        .await?;
      trip.participants.extend(participants);
    }

    transaction.commit().await?;
    Ok(trip)
  }
}

fn participants_insert(
  trip_id: &str,
  participants: &[CreateParticipant],
) -> QueryBuilder<'static, Postgres> {
  let mut builder = QueryBuilder::<Postgres>::new(
    "INSERT INTO participants (id, trip_id, name, email, is_confirmed, is_owner) ",
  );
  builder.push_values(participants, |mut row, participant| {
    row
      .push_bind(participant.id.clone())
      .push_bind(trip_id.to_string())
      .push_bind(participant.name.clone())
      .push_bind(participant.email.clone())
      .push_bind(participant.is_confirmed)
      .push_bind(participant.is_owner);
  });
  builder.push(" RETURNING id, trip_id, name, email, is_confirmed, is_owner");
  builder
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTrip {
  pub id: String,
  pub destination: String,
  pub starts_at: DateTime<Utc>,
  pub ends_at: DateTime<Utc>,
  pub participants: Vec<CreateParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParticipant {
  pub id: String,
  pub name: Option<String>,
  pub email: String,
  pub is_confirmed: bool,
  pub is_owner: bool,
}

impl From<PgRow> for Trip {
  fn from(row: PgRow) -> Self {
    Self {
      id: row.get("id"),
      destination: row.get("destination"),
      starts_at: row.get::<DateTime<Utc>, _>("starts_at"),
      ends_at: row.get::<DateTime<Utc>, _>("ends_at"),
      created_at: row.get::<DateTime<Utc>, _>("created_at"),
      participants: Vec::new(),
    }
  }
}

impl From<PgRow> for Participant {
  fn from(row: PgRow) -> Self {
    Self {
      id: row.get("id"),
      trip_id: row.get("trip_id"),
      name: row.get("name"),
      email: row.get("email"),
      is_confirmed: row.get("is_confirmed"),
      is_owner: row.get("is_owner"),
    }
  }
}
