pub mod monitoring;
pub mod repositories;
