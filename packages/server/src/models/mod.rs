pub mod auth;
pub mod gram;
