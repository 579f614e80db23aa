//! services/clinic_api/src/constants.rs
//!
//! Default identifiers and worked example payloads, consulted by validation
//! error payloads and the `/reference` endpoint so automated callers can
//! fill required fields they do not supply.
//!
//! The IDs are placeholders shaped like real remote identifiers (decimal
//! strings longer than 10 characters); deployments substitute their own via
//! the remote API.

use serde_json::{json, Value};

/// Default business for appointments.
pub const DEFAULT_BUSINESS_ID: &str = "1000000000000000003";

/// Standard appointment type.
pub const DEFAULT_APPOINTMENT_TYPE_ID: &str = "1000000000000000002";

/// Default practitioner.
pub const DEFAULT_PRACTITIONER_ID: &str = "1000000000000000001";

/// Identifier used in worked examples and validation hints.
pub const EXAMPLE_PATIENT_ID: &str = "1000000000000000004";

/// The default identifiers as one payload.
pub fn defaults() -> Value {
    json!({
        "practitioner_id": DEFAULT_PRACTITIONER_ID,
        "appointment_type_id": DEFAULT_APPOINTMENT_TYPE_ID,
        "business_id": DEFAULT_BUSINESS_ID,
    })
}

/// The smallest payload `create_patient` accepts.
pub fn minimal_patient_example() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Smith",
    })
}

/// A fully populated `create_patient` payload.
pub fn complete_patient_example() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Smith",
        "email": "john.smith@email.com",
        "date_of_birth": "1985-03-15",
        "title": "Mr",
        "sex": "Male",
        "address_1": "123 Main Street",
        "city": "London",
        "country": "United Kingdom",
        "post_code": "SW1A 1AA",
        "occupation": "Software Engineer",
    })
}

/// A `create_appointment` payload that passes every validation check.
pub fn appointment_example() -> Value {
    json!({
        "patient_id": EXAMPLE_PATIENT_ID,
        "practitioner_id": DEFAULT_PRACTITIONER_ID,
        "appointment_type_id": DEFAULT_APPOINTMENT_TYPE_ID,
        "business_id": DEFAULT_BUSINESS_ID,
        "appointment_start": "2025-09-05T10:00:00Z",
        "appointment_end": "2025-09-05T11:00:00Z",
        "notes": "Optional notes",
    })
}

/// The `starts_at`/`ends_at` field names updates use instead of the
/// `appointment_start`/`appointment_end` names accepted on create.
pub fn appointment_update_example() -> Value {
    json!({
        "starts_at": "2025-09-07T14:00:00Z",
        "ends_at": "2025-09-07T15:00:00Z",
        "notes": "Updated appointment time",
    })
}
