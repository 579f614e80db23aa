pub mod domain;
pub mod ports;
pub mod session;
pub mod validate;

pub use domain::{ExtractionFailure, ExtractionResult, Resource, UpdateMethod};
pub use ports::{ClinicApi, PageExtractionService, PortError, PortResult, QuestionAnsweringService};
pub use session::SessionStore;
