pub mod rest;
pub mod state;

// Re-export the handlers the binary wires into the router.
pub use rest::{ask_handler, health_handler, scrape_handler};
