pub mod analysis;
pub mod fundamentals;
