mod config;
mod error;
mod lookup;

pub use config::RestLookupConfig;
pub use error::{RestLookupError, RestResult};
pub use lookup::RestClueLookup;
