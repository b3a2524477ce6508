pub mod errors;
pub mod monitoring;
pub mod principal;
