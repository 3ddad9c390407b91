use std::sync::Arc;

use crate::assets::AssetVersion;
use crate::session::SearchSession;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SearchSession>,
    pub assets: Arc<AssetVersion>,
}
