pub mod gram;
pub mod user;
