pub mod cliniko;

pub use cliniko::ClinikoClient;
