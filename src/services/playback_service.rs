use tracing::info;

use crate::{
    dto::stage::{PlaybackResponse, TargetChangeResponse, TargetView},
    error::ServiceError,
    state::SharedState,
};

/// Targets currently mounted on the shared display.
pub fn list_targets(state: &SharedState) -> Vec<TargetView> {
    state
        .stage()
        .targets()
        .into_iter()
        .map(|(name, state)| TargetView { name, state })
        .collect()
}

/// Mount a presentation target.
pub fn mount_target(state: &SharedState, name: String) -> TargetChangeResponse {
    let changed = state.stage().mount(name.clone());
    info!(target_name = %name, changed, "target mounted");
    TargetChangeResponse { name, changed }
}

/// Unmount a presentation target.
pub fn unmount_target(state: &SharedState, name: String) -> Result<TargetChangeResponse, ServiceError> {
    if !state.stage().unmount(&name) {
        return Err(ServiceError::NotFound(format!("target {name} is not mounted")));
    }
    info!(target_name = %name, "target unmounted");
    Ok(TargetChangeResponse {
        name,
        changed: true,
    })
}

/// Hold every running animation.
pub fn pause(state: &SharedState) -> PlaybackResponse {
    PlaybackResponse {
        signalled: state.runtime().pause_all(),
    }
}

/// Resume every paused animation.
pub fn resume(state: &SharedState) -> PlaybackResponse {
    PlaybackResponse {
        signalled: state.runtime().resume_all(),
    }
}

/// Abort every running animation.
pub fn stop(state: &SharedState) -> PlaybackResponse {
    PlaybackResponse {
        signalled: state.runtime().stop_all(),
    }
}
