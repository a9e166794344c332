// RTK GPS Settings
// Stream endpoint configuration for the RTK positioning engine

pub mod commands;
pub mod models;
pub mod services;
