pub mod attendance;
pub mod network;
