pub mod input;
pub mod math;
pub mod random;
pub mod time;
