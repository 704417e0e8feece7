use dashmap::DashSet;
use futures::{FutureExt, future::BoxFuture};

use crate::{
    dao::clue_lookup::{DailyDoubleLookup, LookupResult},
    state::game::ClueId,
};

/// Lookup backed by a fixed set of daily double clue identifiers.
///
/// Used when no remote clue store is configured; unknown clues are regular clues.
#[derive(Debug, Default)]
pub struct InMemoryClueLookup {
    daily_doubles: DashSet<ClueId>,
}

impl InMemoryClueLookup {
    /// Create a lookup knowing the given daily doubles.
    pub fn new(daily_doubles: impl IntoIterator<Item = ClueId>) -> Self {
        Self {
            daily_doubles: daily_doubles.into_iter().collect(),
        }
    }

    /// Flag an additional clue as daily double.
    pub fn mark(&self, clue_id: impl Into<ClueId>) {
        self.daily_doubles.insert(clue_id.into());
    }
}

impl DailyDoubleLookup for InMemoryClueLookup {
    fn is_daily_double(&self, clue_id: &str) -> BoxFuture<'static, LookupResult<bool>> {
        let found = self.daily_doubles.contains(clue_id);
        async move { Ok(found) }.boxed()
    }
}
