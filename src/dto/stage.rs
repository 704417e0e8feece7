use serde::Serialize;
use utoipa::ToSchema;

use crate::animation::TargetState;

/// A mounted presentation target and its current end state.
#[derive(Debug, Serialize, ToSchema)]
pub struct TargetView {
    /// Target name, e.g. `clue-c42`.
    pub name: String,
    /// End state written by the last animation.
    #[serde(flatten)]
    pub state: TargetState,
}

/// Outcome of a mount or unmount request.
#[derive(Debug, Serialize, ToSchema)]
pub struct TargetChangeResponse {
    /// Target that was mounted or unmounted.
    pub name: String,
    /// Whether the call changed anything.
    pub changed: bool,
}

/// Outcome of a pause, resume or stop request.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaybackResponse {
    /// Number of running animations that received the signal.
    pub signalled: usize,
}
