pub mod created_trip_rto;
