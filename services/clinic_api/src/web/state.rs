//! services/clinic_api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use gateway_core::ClinicApi;

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub clinic: Arc<dyn ClinicApi>,
    pub config: Arc<Config>,
}
