mod helpers;
mod shared;
mod trips;

use std::io;
use std::sync::Arc;

use actix_governor::{Governor, GovernorConfig, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use helpers::custom_nanoid;
use log::info;
use shared::config::Config;
use shared::database::Database;
use shared::http_error::json_error_handler;
use shared::mailer::{Mailer, SmtpMailer};
use trips::create_trip;
use trips::repository::trip_repository::{TripRepository, TripRepositoryImpl};

// This struct represents state
struct AppState<TR: TripRepository, M: Mailer> {
  trip_repository: TR,
  mailer: M,
  config: Config,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));

  let config = Config::default();
  let database = Database::connect(&config).await.map_err(io::Error::other)?;
  let database = Arc::new(database);
  let mailer = SmtpMailer::new(&config.mail).map_err(io::Error::other)?;

  let server_address = config.server_address.clone();
  info!("Listening on http://{}", server_address);

  HttpServer::new(move || {
    let app_state = AppState {
      trip_repository: TripRepositoryImpl::new(database.clone()),
      mailer: mailer.clone(),
      config: config.clone(),
    };
    App::new()
      .wrap(Logger::default())
      .configure(|cfg| configure(cfg, app_state))
  })
  .bind(server_address)?
  .run()
  .await
}

// Function to initialize the App
fn configure<TR: TripRepository + 'static, M: Mailer + 'static>(
  cfg: &mut web::ServiceConfig,
  app_state: AppState<TR, M>,
) {
  // Rate limit per peer IP. Zero values fall back to the governor defaults;
  // the builder divides by the rate, so it must never see zero.
  let rate_limit = &app_state.config.rate_limit;
  let governor_config = if rate_limit.per_second == 0 || rate_limit.burst_size == 0 {
    GovernorConfig::default()
  } else {
    GovernorConfigBuilder::default()
      .requests_per_second(rate_limit.per_second)
      .burst_size(rate_limit.burst_size)
      .finish()
      .unwrap_or_default()
  };

  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::Data::new(app_state))
    .service(
      web::scope("/trip")
        .wrap(Governor::new(&governor_config))
        .route("", web::post().to(create_trip::<TR, M>)),
    );
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{
    http::{header::HeaderValue, StatusCode},
    test, App,
  };
  use helpers::tests::CallLog;
  use shared::{
    config::RateLimitConfig, http_error::HttpError, mailer::tests::InMemoryMailer,
  };
  use std::{net::SocketAddr, str::FromStr};
  use trips::{
    repository::trip_repository::tests::InMemoryTripRepository,
    rto::created_trip_rto::CreatedTripRto,
  };

  fn post_trip(body: serde_json::Value) -> test::TestRequest {
    test::TestRequest::post()
      .uri("/trip")
      .peer_addr(SocketAddr::from_str("127.0.0.1:12345").unwrap())
      .append_header((
        actix_web::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
      ))
      .set_json(body)
  }

  fn test_config() -> Config {
    let mut config = Config::default();
    config.rate_limit = RateLimitConfig {
      per_second: 1,
      burst_size: 100,
    };
    config
  }

  #[actix_rt::test]
  async fn test_create_trip_in_memory() {
    let calls = CallLog::default();
    let trip_repository = InMemoryTripRepository::new(calls.clone());
    let mailer = InMemoryMailer::new(calls.clone());

    // Initialize the service in-memory
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: trip_repository.clone(),
          mailer: mailer.clone(),
          config: test_config(),
        },
      )
    }))
    .await;

    let create_req = post_trip(serde_json::json!({
      "destination": "Chapada Diamantina",
      "starts_at": "2099-07-01",
      "ends_at": "2099-07-01",
      "owner_name": "A",
      "owner_email": "a@x.com",
      "emails_to_invite": ["b@x.com", "c@x.com"]
    }))
    .to_request();

    let create_resp = test::call_service(&app, create_req).await;
    assert_eq!(create_resp.status(), StatusCode::OK, "Create trip failed");

    let created: CreatedTripRto = test::read_body_json(create_resp).await;
    let trip = trip_repository
      .find_one(&created.trip_id)
      .expect("trip should be stored");
    assert_eq!(trip.starts_at, trip.ends_at);
    assert_eq!(trip.participants.len(), 3);
    assert_eq!(calls.entries(), vec!["send_mail", "create_trip"]);
    assert_eq!(mailer.sent.read().unwrap()[0].to.address, "a@x.com");
  }

  #[actix_rt::test]
  async fn test_create_trip_accepts_epoch_millis() {
    let calls = CallLog::default();
    let trip_repository = InMemoryTripRepository::new(calls.clone());
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: trip_repository.clone(),
          mailer: InMemoryMailer::new(calls.clone()),
          config: test_config(),
        },
      )
    }))
    .await;

    let resp = test::call_service(
      &app,
      post_trip(serde_json::json!({
        "destination": "Ushuaia",
        "starts_at": 4_102_444_800_000_i64,
        "ends_at": 4_103_049_600_000_i64,
        "owner_name": "Bruna",
        "owner_email": "bruna@example.com"
      }))
      .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let created: CreatedTripRto = test::read_body_json(resp).await;
    let trip = trip_repository.find_one(&created.trip_id).unwrap();
    assert!(trip.participants.is_empty());
  }

  #[actix_rt::test]
  async fn test_invalid_start_date_is_bad_request() {
    let calls = CallLog::default();
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: InMemoryTripRepository::new(calls.clone()),
          mailer: InMemoryMailer::new(calls.clone()),
          config: test_config(),
        },
      )
    }))
    .await;

    let resp = test::call_service(
      &app,
      post_trip(serde_json::json!({
        "destination": "Salvador",
        "starts_at": "2001-01-01T00:00:00Z",
        "ends_at": "2001-01-02T00:00:00Z",
        "owner_name": "Carla",
        "owner_email": "carla@example.com",
        "emails_to_invite": []
      }))
      .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let error: HttpError = test::read_body_json(resp).await;
    assert_eq!(error.message, "Ivalid trip start date.");
    assert!(calls.entries().is_empty());
  }

  #[actix_rt::test]
  async fn test_malformed_body_is_bad_request() {
    let calls = CallLog::default();
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: InMemoryTripRepository::new(calls.clone()),
          mailer: InMemoryMailer::new(calls.clone()),
          config: test_config(),
        },
      )
    }))
    .await;

    let resp = test::call_service(
      &app,
      post_trip(serde_json::json!({
        "destination": "Salvador",
        "starts_at": "someday",
        "ends_at": "2099-01-02T00:00:00Z",
        "owner_name": "Carla",
        "owner_email": "carla@example.com"
      }))
      .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let error: HttpError = test::read_body_json(resp).await;
    assert!(!error.message.is_empty());
    assert!(calls.entries().is_empty());
  }

  #[actix_rt::test]
  async fn test_mail_failure_is_internal_server_error() {
    let calls = CallLog::default();
    let trip_repository = InMemoryTripRepository::new(calls.clone());
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: trip_repository.clone(),
          mailer: InMemoryMailer::failing(calls.clone()),
          config: test_config(),
        },
      )
    }))
    .await;

    let resp = test::call_service(
      &app,
      post_trip(serde_json::json!({
        "destination": "Recife",
        "starts_at": "2099-03-01T09:00:00Z",
        "ends_at": "2099-03-05T18:00:00Z",
        "owner_name": "Davi",
        "owner_email": "davi@example.com"
      }))
      .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: HttpError = test::read_body_json(resp).await;
    assert_eq!(error.message, "Internal server error");
    assert!(trip_repository.trips.read().unwrap().is_empty());
  }

  #[actix_rt::test]
  async fn test_zero_rate_limit_falls_back_to_defaults() {
    let calls = CallLog::default();
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
      per_second: 0,
      burst_size: 0,
    };
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: InMemoryTripRepository::new(calls.clone()),
          mailer: InMemoryMailer::new(calls.clone()),
          config,
        },
      )
    }))
    .await;

    let resp = test::call_service(
      &app,
      post_trip(serde_json::json!({
        "destination": "Bonito",
        "starts_at": "2099-09-01",
        "ends_at": "2099-09-04",
        "owner_name": "Eva",
        "owner_email": "eva@example.com"
      }))
      .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[actix_rt::test]
  async fn test_rate_limit_exceeded_is_too_many_requests() {
    let calls = CallLog::default();
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
      per_second: 1,
      burst_size: 1,
    };
    let app = test::init_service(App::new().configure(|cfg| {
      configure(
        cfg,
        AppState {
          trip_repository: InMemoryTripRepository::new(calls.clone()),
          mailer: InMemoryMailer::new(calls.clone()),
          config,
        },
      )
    }))
    .await;

    let body = serde_json::json!({
      "destination": "Paraty",
      "starts_at": "2099-10-01",
      "ends_at": "2099-10-03",
      "owner_name": "Fabio",
      "owner_email": "fabio@example.com"
    });

    let first = test::call_service(&app, post_trip(body.clone()).to_request()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = test::call_service(&app, post_trip(body).to_request()).await;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    // The rejected request never reaches the handler.
    assert_eq!(calls.entries(), vec!["send_mail", "create_trip"]);
  }
}
