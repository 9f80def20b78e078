pub mod data_uri;
pub mod payment;
pub mod repository;
pub mod reservation;
pub mod square;
