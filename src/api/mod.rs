pub mod attendance;
pub mod employee;
pub mod network;
pub mod shift;
