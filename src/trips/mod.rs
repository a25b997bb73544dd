pub mod dto;
pub mod error;
pub mod model;
pub mod repository;
pub mod rto;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use dto::create_trip_dto::CreateTripDto;
use error::TripError;
use log::info;
use model::Trip;
use repository::trip_repository::{CreateParticipant, CreateTrip, TripRepository};
use rto::created_trip_rto::CreatedTripRto;
use validator::Validate;

use crate::{
  custom_nanoid,
  shared::{
    config::MailConfig,
    mailer::{MailAddress, MailMessage, Mailer},
  },
  AppState,
};

pub async fn create_trip<TR: TripRepository + 'static, M: Mailer + 'static>(
  data: web::Data<AppState<TR, M>>,
  payload: web::Json<CreateTripDto>,
) -> Result<HttpResponse, TripError> {
  let dto = payload.into_inner();
  // Perform validation
  if let Err(validation_errors) = dto.validate() {
    // If validation fails, return a 400 error with details
    return Ok(HttpResponse::BadRequest().json(validation_errors));
  }
  check_trip_dates(dto.starts_at, dto.ends_at, Utc::now())?;

  let handle = data
    .mailer
    .send_mail(owner_notification(&data.config.mail, &dto))
    .await?;
  match data.mailer.test_message_url(&handle) {
    Some(url) => info!("Trip notification preview: {}", url),
    None => info!("Trip notification sent to {:?}", handle.accepted),
  }

  let trip = data.trip_repository.create(CreateTrip::from(dto)).await?;
  info!(
    "Created trip {} to {} with {} participant(s) at {}",
    trip.id,
    trip.destination,
    trip.participants.len(),
    trip.created_at
  );
  Ok(trip_created(trip))
}

/// Equal instants pass both checks; only strictly earlier dates are rejected.
fn check_trip_dates(
  starts_at: DateTime<Utc>,
  ends_at: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<(), TripError> {
  if starts_at < now {
    return Err(TripError::InvalidStartDate);
  }
  if ends_at < starts_at {
    return Err(TripError::InvalidEndDate);
  }
  Ok(())
}

fn owner_notification(config: &MailConfig, dto: &CreateTripDto) -> MailMessage {
  MailMessage {
    from: MailAddress {
      name: Some(config.from_name.clone()),
      address: config.from_address.clone(),
    },
    to: MailAddress {
      name: Some(dto.owner_name.clone()),
      address: dto.owner_email.clone(),
    },
    subject: String::from("Testando o envio de email"),
    html: String::from("<strong>Teste de envio de email</strong>"),
  }
}

fn trip_created(trip: Trip) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .json(CreatedTripRto::from(trip))
}

impl From<CreateTripDto> for CreateTrip {
  fn from(dto: CreateTripDto) -> Self {
    let participants = match dto.emails_to_invite {
      Some(emails) => {
        let owner = CreateParticipant {
          id: custom_nanoid(),
          name: Some(dto.owner_name),
          email: dto.owner_email,
          is_confirmed: true,
          is_owner: true,
        };
        std::iter::once(owner)
          .chain(emails.into_iter().map(|email| CreateParticipant {
            id: custom_nanoid(),
            name: None,
            email,
            is_confirmed: false,
            is_owner: false,
          }))
          .collect()
      }
      None => Vec::new(),
    };
    Self {
      id: custom_nanoid(),
      destination: dto.destination,
      starts_at: dto.starts_at,
      ends_at: dto.ends_at,
      participants,
    }
  }
}

// Transform Trip domain to RTO
impl From<Trip> for CreatedTripRto {
  fn from(trip: Trip) -> Self {
    Self { trip_id: trip.id }
  }
}
