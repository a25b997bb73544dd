pub mod create_trip_dto;
