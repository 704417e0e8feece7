pub mod memory;
#[cfg(feature = "rest-lookup")]
pub mod rest;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::game::ClueId;

/// Result alias for clue lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Error raised by clue lookups regardless of the backing store.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The backing store could not answer.
    #[error("clue lookup unavailable: {message}")]
    Unavailable {
        /// What the lookup was doing when it failed.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The store answered but does not know the clue.
    #[error("clue `{0}` not found")]
    NotFound(ClueId),
    /// The store did not answer in time.
    #[error("clue lookup timed out")]
    Timeout,
}

impl LookupError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        LookupError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Answers whether a clue is a daily double.
pub trait DailyDoubleLookup: Send + Sync {
    /// Resolve whether `clue_id` is a daily double.
    fn is_daily_double(&self, clue_id: &str) -> BoxFuture<'static, LookupResult<bool>>;
}
