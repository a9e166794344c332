// RTK GPS Models
// Data structures shared by the settings layer and the positioning engine

mod stream_type;
mod stream_format;
mod stream_endpoint;
mod stream_settings;
mod server_settings;
mod preference;

pub use stream_type::*;
pub use stream_format::*;
pub use stream_endpoint::*;
pub use stream_settings::*;
pub use server_settings::*;
pub use preference::*;
