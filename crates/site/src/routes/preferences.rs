//! Visitor preferences API.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::AppState;

/// The podcast player mute flag, as carried by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct MutePreference {
    pub muted: bool,
}

/// Read the current mute flag.
#[instrument(skip(state))]
pub async fn get_mute(State(state): State<AppState>) -> impl IntoResponse {
    Json(MutePreference {
        muted: state.prefs().muted(),
    })
}

/// Set the mute flag. Persisted before the response is sent.
#[instrument(skip(state))]
pub async fn set_mute(
    State(state): State<AppState>,
    Json(preference): Json<MutePreference>,
) -> impl IntoResponse {
    state.prefs().set_muted(preference.muted);
    Json(preference)
}
