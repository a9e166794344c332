// RTK GPS Services
// Codec, preference storage and settings assembly

mod events;
mod stream_path;
mod preferences;
mod json_preferences;
mod engine_options;
mod settings_loader;
pub mod stream_clients;

pub use events::*;
pub use stream_path::*;
pub use preferences::*;
pub use json_preferences::*;
pub use engine_options::*;
pub use settings_loader::*;

#[cfg(test)]
pub(crate) use events::testing;
