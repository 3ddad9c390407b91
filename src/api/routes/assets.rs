use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    /// False while the default is being served
    pub loaded: bool,
}

/// Current asset version. Never waits on the network; the first call starts the fetch.
pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    let _ = state.assets.init_in_background();
    Json(VersionResponse {
        version: state.assets.current(),
        loaded: state.assets.is_loaded(),
    })
}
