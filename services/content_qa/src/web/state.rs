//! services/content_qa/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use gateway_core::{PageExtractionService, QuestionAnsweringService, SessionStore};

use crate::config::Config;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub extractor: Arc<dyn PageExtractionService>,
    pub qa: Arc<dyn QuestionAnsweringService>,
    pub config: Arc<Config>,
}
