pub mod coerce_date;
pub mod config;
pub mod database;
pub mod http_error;
pub mod mailer;
