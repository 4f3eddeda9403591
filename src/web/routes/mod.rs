pub mod auth;
pub mod rating;
pub mod registration;
pub mod user;
