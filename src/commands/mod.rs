// RTK GPS Commands
// Handlers behind the invoke API; errors are flattened to strings

mod settings;
mod stream;

pub use settings::*;
pub use stream::*;

use crate::models::StreamRole;

fn parse_role(name: &str) -> Result<StreamRole, String> {
    StreamRole::from_store_name(name).ok_or_else(|| format!("Unknown stream role: {name}"))
}
