pub mod booking;
pub mod prediction;
