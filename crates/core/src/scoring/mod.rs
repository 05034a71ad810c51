pub mod adaptive;
pub mod combine;
pub mod indicators;
pub mod rational;
