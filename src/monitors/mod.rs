pub mod occupancy;
pub mod round;
