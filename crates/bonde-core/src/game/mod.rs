pub mod round;
pub mod series;
