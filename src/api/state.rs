use std::sync::Arc;

use chrono_tz::Tz;

use crate::api::auth::AdminAuth;
use crate::storage::Store;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// Reference timezone whose calendar defines a scoring day.
    pub tz: Tz,
    pub auth: Arc<AdminAuth>,
}
