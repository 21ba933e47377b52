pub mod app;
pub mod config;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod state;
pub mod timer;
pub mod tone;
