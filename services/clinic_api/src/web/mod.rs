pub mod rest;
pub mod state;
pub mod tools;

// Re-export the handlers the binary wires into the router.
pub use rest::{health_handler, reference_handler};
pub use tools::{call_tool_handler, list_tools_handler};
