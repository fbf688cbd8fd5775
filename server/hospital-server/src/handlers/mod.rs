pub mod appointments;
pub mod auth;
pub mod health;
pub mod medications;
pub mod patients;
pub mod rooms;
pub mod staff;
