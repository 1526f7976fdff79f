pub mod cadence;
pub mod driver;
pub mod service;
