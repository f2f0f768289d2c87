pub mod auth;
pub mod verify;
