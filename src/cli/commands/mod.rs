pub mod config;
pub mod devices;
pub mod device;
pub mod doctor;
pub mod simulator;
