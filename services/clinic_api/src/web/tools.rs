//! services/clinic_api/src/web/tools.rs
//!
//! The tool registry: every (resource, operation) pair on the remote clinic
//! API is exposed as a named, independently invocable tool with a
//! human-readable description. Patient and appointment tools validate their
//! fields before any remote call; invoice and practitioner tools are direct
//! passthroughs (a long-standing inconsistency of this surface, kept as-is
//! and noted in the tool descriptions).
//!
//! Every tool response is HTTP 200 carrying either the remote API's JSON or
//! a structured `{"error": ...}` payload with actionable hints. Nothing
//! raises past this boundary.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::warn;
use utoipa::ToSchema;

use gateway_core::validate;
use gateway_core::{ClinicApi, Resource};

use crate::constants;
use crate::web::state::AppState;

//=========================================================================================
// Tool Descriptors
//=========================================================================================

/// A named operation with a machine-readable description of its contract.
#[derive(Serialize, ToSchema)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

pub const TOOLS: [ToolSpec; 20] = [
    ToolSpec {
        name: "list_patients",
        description: "List/search all patients. Use an empty `q` (or omit it) to get all \
                      patients; search by name may not match in every deployment, so prefer \
                      listing and filtering client-side.",
    },
    ToolSpec {
        name: "get_patient",
        description: "Get a specific patient by `patient_id` (a string of digits longer than \
                      10 characters).",
    },
    ToolSpec {
        name: "create_patient",
        description: "Create a new patient from a `patient` object. Required: `first_name`, \
                      `last_name` (both non-empty). Optional: `email`, `date_of_birth` \
                      (YYYY-MM-DD), `title`, `sex`, `gender_identity`, `address_1..3`, `city`, \
                      `country`, `post_code`, `notes`, `occupation`, `emergency_contact`. \
                      Minimal example: {\"first_name\": \"John\", \"last_name\": \"Smith\"}. \
                      Successful responses include a denormalized `patient_name`.",
    },
    ToolSpec {
        name: "update_patient",
        description: "Update an existing patient (full replace). Takes `patient_id` plus a \
                      `patient` object with the same field names as create_patient.",
    },
    ToolSpec {
        name: "delete_patient",
        description: "Delete (archive) a patient by `patient_id`.",
    },
    ToolSpec {
        name: "list_appointments",
        description: "List/search all appointments. Use an empty `q` (or omit it) to get all \
                      appointments.",
    },
    ToolSpec {
        name: "get_appointment",
        description: "Get a specific appointment by `appointment_id` (a string of digits \
                      longer than 10 characters).",
    },
    ToolSpec {
        name: "create_appointment",
        description: "Create a new appointment from an `appointment` object. Required: \
                      `patient_id`, `practitioner_id`, `appointment_type_id`, `business_id`, \
                      and one time pair, either (`appointment_start` + `appointment_end`) or \
                      (`starts_at` + `ends_at`), as ISO datetimes with a Z suffix \
                      (YYYY-MM-DDTHH:MM:SSZ). Optional: `notes`. Default IDs are available \
                      from the /reference endpoint; validation errors include a working \
                      example.",
    },
    ToolSpec {
        name: "update_appointment",
        description: "Update an existing appointment (partial merge). Takes `appointment_id` \
                      plus an `appointment` object. Update uses DIFFERENT field names than \
                      create: only `starts_at`, `ends_at` (ISO datetimes with Z suffix) and \
                      `notes` are accepted.",
    },
    ToolSpec {
        name: "delete_appointment",
        description: "Delete (cancel) an appointment by `appointment_id`.",
    },
    ToolSpec {
        name: "list_invoices",
        description: "List/search all invoices. Direct passthrough; no local validation.",
    },
    ToolSpec {
        name: "get_invoice",
        description: "Get a specific invoice by `invoice_id`. Direct passthrough; no local \
                      validation.",
    },
    ToolSpec {
        name: "create_invoice",
        description: "Create a new invoice from an `invoice` object. Direct passthrough; the \
                      remote API validates the payload.",
    },
    ToolSpec {
        name: "update_invoice",
        description: "Update an existing invoice (full replace). Takes `invoice_id` plus an \
                      `invoice` object. Direct passthrough.",
    },
    ToolSpec {
        name: "delete_invoice",
        description: "Delete an invoice by `invoice_id`. Direct passthrough.",
    },
    ToolSpec {
        name: "list_practitioners",
        description: "List/search all practitioners. Direct passthrough; no local validation.",
    },
    ToolSpec {
        name: "get_practitioner",
        description: "Get a specific practitioner by `practitioner_id`. Direct passthrough.",
    },
    ToolSpec {
        name: "create_practitioner",
        description: "Create a new practitioner from a `practitioner` object. Direct \
                      passthrough; the remote API validates the payload.",
    },
    ToolSpec {
        name: "update_practitioner",
        description: "Update an existing practitioner (full replace). Takes `practitioner_id` \
                      plus a `practitioner` object. Direct passthrough.",
    },
    ToolSpec {
        name: "delete_practitioner",
        description: "Delete a practitioner by `practitioner_id`. Direct passthrough.",
    },
];

//=========================================================================================
// Axum Handlers
//=========================================================================================

/// List every registered tool with its description.
#[utoipa::path(
    get,
    path = "/tools",
    responses((status = 200, description = "The registered tools and their contracts"))
)]
pub async fn list_tools_handler() -> Json<Value> {
    Json(json!({ "tools": TOOLS }))
}

/// Invoke a tool by name with a JSON argument object.
///
/// Always responds 200; validation and remote failures are structured
/// `{"error": ...}` payloads, matching what automated callers expect.
#[utoipa::path(
    post,
    path = "/tools/{name}",
    params(("name" = String, Path, description = "The tool to invoke")),
    responses((status = 200, description = "Remote API JSON or a structured error payload"))
)]
pub async fn call_tool_handler(
    State(app_state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Json<Value> {
    let args = body.map(|Json(v)| v).unwrap_or_else(|| json!({}));
    Json(dispatch(app_state.clinic.as_ref(), &name, &args).await)
}

//=========================================================================================
// Dispatch
//=========================================================================================

/// Route a tool invocation to its implementation.
pub async fn dispatch(clinic: &dyn ClinicApi, name: &str, args: &Value) -> Value {
    match name {
        "list_patients" => list_tool(clinic, Resource::Patient, args).await,
        "get_patient" => get_validated(clinic, Resource::Patient, args).await,
        "create_patient" => create_patient(clinic, args).await,
        "update_patient" => update_patient(clinic, args).await,
        "delete_patient" => delete_validated(clinic, Resource::Patient, args, "archived").await,

        "list_appointments" => list_tool(clinic, Resource::Appointment, args).await,
        "get_appointment" => get_validated(clinic, Resource::Appointment, args).await,
        "create_appointment" => create_appointment(clinic, args).await,
        "update_appointment" => update_appointment(clinic, args).await,
        "delete_appointment" => {
            delete_validated(clinic, Resource::Appointment, args, "deleted").await
        }

        "list_invoices" => list_tool(clinic, Resource::Invoice, args).await,
        "get_invoice" => get_passthrough(clinic, Resource::Invoice, args).await,
        "create_invoice" => create_passthrough(clinic, Resource::Invoice, args).await,
        "update_invoice" => update_passthrough(clinic, Resource::Invoice, args).await,
        "delete_invoice" => delete_passthrough(clinic, Resource::Invoice, args).await,

        "list_practitioners" => list_tool(clinic, Resource::Practitioner, args).await,
        "get_practitioner" => get_passthrough(clinic, Resource::Practitioner, args).await,
        "create_practitioner" => create_passthrough(clinic, Resource::Practitioner, args).await,
        "update_practitioner" => update_passthrough(clinic, Resource::Practitioner, args).await,
        "delete_practitioner" => delete_passthrough(clinic, Resource::Practitioner, args).await,

        _ => json!({
            "error": format!("Unknown tool: {name}"),
            "available_tools": TOOLS.iter().map(|t| t.name).collect::<Vec<_>>(),
        }),
    }
}

//=========================================================================================
// Argument Helpers
//=========================================================================================

/// Reads an identifier argument, accepting both strings and integers;
/// integers are coerced to their decimal string form.
fn id_arg(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn payload_arg(args: &Value, key: &str) -> Option<Map<String, Value>> {
    args.get(key).and_then(Value::as_object).cloned()
}

fn query_arg(args: &Value) -> &str {
    args.get("q").and_then(Value::as_str).unwrap_or("")
}

fn missing_arg_error(tool_kind: &str, key: &str) -> Value {
    json!({ "error": format!("{tool_kind} requires a `{key}` argument") })
}

fn resource_label(resource: Resource) -> &'static str {
    match resource {
        Resource::Patient => "Patient",
        Resource::Appointment => "Appointment",
        Resource::Invoice => "Invoice",
        Resource::Practitioner => "Practitioner",
    }
}

//=========================================================================================
// Generic Operations
//=========================================================================================

async fn list_tool(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    match clinic.list(resource, query_arg(args)).await {
        Ok(items) => {
            let mut body = Map::new();
            body.insert(resource.plural().to_string(), Value::Array(items));
            Value::Object(body)
        }
        Err(e) => {
            warn!(resource = %resource, error = %e, "list call failed");
            let mut body = Map::new();
            body.insert(
                "error".to_string(),
                Value::String(format!("Failed to list {}: {e}", resource.plural())),
            );
            body.insert(resource.plural().to_string(), Value::Array(Vec::new()));
            Value::Object(body)
        }
    }
}

async fn get_validated(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    let key = format!("{}_id", resource.name());
    let Some(id) = id_arg(args, &key) else {
        return missing_arg_error(&format!("get_{}", resource.name()), &key);
    };
    if let Err(reason) = validate::id_format(&id) {
        return json!({
            "error": format!("Invalid {key} format. {reason}"),
            "received": id,
            "example": constants::EXAMPLE_PATIENT_ID,
        });
    }
    match clinic.get(resource, &id).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to get {resource}: {e}") }),
    }
}

async fn get_passthrough(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    let key = format!("{}_id", resource.name());
    let Some(id) = id_arg(args, &key) else {
        return missing_arg_error(&format!("get_{}", resource.name()), &key);
    };
    match clinic.get(resource, &id).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to get {resource}: {e}") }),
    }
}

async fn create_passthrough(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    let Some(payload) = payload_arg(args, resource.name()) else {
        return missing_arg_error(&format!("create_{}", resource.name()), resource.name());
    };
    match clinic.create(resource, Value::Object(payload)).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to create {resource}: {e}") }),
    }
}

async fn update_passthrough(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    let key = format!("{}_id", resource.name());
    let Some(id) = id_arg(args, &key) else {
        return missing_arg_error(&format!("update_{}", resource.name()), &key);
    };
    let payload = payload_arg(args, resource.name()).unwrap_or_default();
    match clinic.update(resource, &id, Value::Object(payload)).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to update {resource}: {e}") }),
    }
}

async fn delete_validated(
    clinic: &dyn ClinicApi,
    resource: Resource,
    args: &Value,
    verb: &str,
) -> Value {
    let key = format!("{}_id", resource.name());
    let Some(id) = id_arg(args, &key) else {
        return missing_arg_error(&format!("delete_{}", resource.name()), &key);
    };
    if let Err(reason) = validate::id_format(&id) {
        return json!({
            "error": format!("Invalid {key} format. {reason}"),
            "received": id,
            "example": constants::EXAMPLE_PATIENT_ID,
        });
    }
    match clinic.delete(resource, &id).await {
        Ok(result) => json!({
            "success": true,
            "message": format!("{} {id} {verb} successfully", resource_label(resource)),
            "result": result,
        }),
        Err(e) => json!({ "error": format!("Failed to delete {resource}: {e}") }),
    }
}

async fn delete_passthrough(clinic: &dyn ClinicApi, resource: Resource, args: &Value) -> Value {
    let key = format!("{}_id", resource.name());
    let Some(id) = id_arg(args, &key) else {
        return missing_arg_error(&format!("delete_{}", resource.name()), &key);
    };
    match clinic.delete(resource, &id).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to delete {resource}: {e}") }),
    }
}

//=========================================================================================
// Patient Tools (validated)
//=========================================================================================

async fn create_patient(clinic: &dyn ClinicApi, args: &Value) -> Value {
    let patient = payload_arg(args, "patient").unwrap_or_default();
    if let Some(error) = validate_create_patient(&patient) {
        return error;
    }
    match clinic.create(Resource::Patient, Value::Object(patient)).await {
        Ok(result) => wrap_created_patient(result),
        Err(e) => json!({
            "error": format!("API call failed: {e}"),
            "troubleshooting": "Check that the email is unique and the date format is correct",
        }),
    }
}

async fn update_patient(clinic: &dyn ClinicApi, args: &Value) -> Value {
    let Some(id) = id_arg(args, "patient_id") else {
        return missing_arg_error("update_patient", "patient_id");
    };
    if let Err(reason) = validate::id_format(&id) {
        return json!({
            "error": format!("Invalid patient_id format. {reason}"),
            "received": id,
            "example": constants::EXAMPLE_PATIENT_ID,
        });
    }
    let patient = payload_arg(args, "patient").unwrap_or_default();
    if let Some(error) = validate_update_patient(&patient) {
        return error;
    }
    match clinic.update(Resource::Patient, &id, Value::Object(patient)).await {
        Ok(result) => result,
        Err(e) => json!({ "error": format!("Failed to update patient: {e}") }),
    }
}

const PATIENT_REQUIRED_FIELDS: [&str; 2] = ["first_name", "last_name"];

/// Returns the validation-error payload for a `create_patient` payload, or
/// `None` when the payload is acceptable.
fn validate_create_patient(patient: &Map<String, Value>) -> Option<Value> {
    // Absent, non-string, and empty-string values all count as missing.
    let missing: Vec<&str> = PATIENT_REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| {
            patient
                .get(*f)
                .and_then(Value::as_str)
                .map(str::is_empty)
                .unwrap_or(true)
        })
        .collect();
    if !missing.is_empty() {
        return Some(json!({
            "error": format!("Missing required fields: {}", missing.join(", ")),
            "required_fields": PATIENT_REQUIRED_FIELDS,
            "minimal_example": constants::minimal_patient_example(),
            "complete_example": constants::complete_patient_example(),
        }));
    }

    let mut validation_errors = optional_patient_field_errors(patient);

    // Whitespace-only names slip past the presence check above.
    for field in PATIENT_REQUIRED_FIELDS {
        let blank = patient
            .get(field)
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(false);
        if blank {
            validation_errors.push(format!("{field} cannot be empty"));
        }
    }

    if validation_errors.is_empty() {
        None
    } else {
        Some(json!({
            "error": "Validation failed",
            "validation_errors": validation_errors,
            "email_format": "user@example.com",
            "date_format": "1985-03-15 (YYYY-MM-DD)",
        }))
    }
}

/// Email and date-of-birth are validated only when present and non-empty.
fn optional_patient_field_errors(patient: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(email) = non_empty_str(patient, "email") {
        if validate::email(email).is_err() {
            errors.push("Invalid email format".to_string());
        }
    }
    if let Some(dob) = non_empty_str(patient, "date_of_birth") {
        if validate::date(dob).is_err() {
            errors.push("Invalid date_of_birth format. Use YYYY-MM-DD".to_string());
        }
    }
    errors
}

fn validate_update_patient(patient: &Map<String, Value>) -> Option<Value> {
    let validation_errors = optional_patient_field_errors(patient);
    if validation_errors.is_empty() {
        None
    } else {
        Some(json!({
            "error": "Validation failed",
            "validation_errors": validation_errors,
        }))
    }
}

fn non_empty_str<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Augments a created patient with a denormalized `patient_name`.
fn wrap_created_patient(result: Value) -> Value {
    let Some(id) = result.get("id").cloned() else {
        return result;
    };
    let first = result.get("first_name").and_then(Value::as_str).unwrap_or("");
    let last = result.get("last_name").and_then(Value::as_str).unwrap_or("");
    let patient_name = format!("{first} {last}").trim().to_string();
    json!({
        "success": true,
        "patient_id": id,
        "patient_name": patient_name,
        "email": result.get("email").cloned().unwrap_or(Value::Null),
        "patient": result,
    })
}

//=========================================================================================
// Appointment Tools (validated)
//=========================================================================================

async fn create_appointment(clinic: &dyn ClinicApi, args: &Value) -> Value {
    let appointment = payload_arg(args, "appointment").unwrap_or_default();
    if let Some(error) = validate_create_appointment(&appointment) {
        return error;
    }
    match clinic
        .create(Resource::Appointment, Value::Object(appointment))
        .await
    {
        Ok(result) => wrap_created_appointment(result),
        Err(e) => json!({
            "error": format!("API call failed: {e}"),
            "troubleshooting": "Check that all IDs exist in your clinic instance and the datetimes are in the future",
        }),
    }
}

async fn update_appointment(clinic: &dyn ClinicApi, args: &Value) -> Value {
    let Some(id) = id_arg(args, "appointment_id") else {
        return missing_arg_error("update_appointment", "appointment_id");
    };
    if let Err(reason) = validate::id_format(&id) {
        return json!({
            "error": format!("Invalid appointment_id format. {reason}"),
            "received": id,
            "example": constants::EXAMPLE_PATIENT_ID,
        });
    }
    let appointment = payload_arg(args, "appointment").unwrap_or_default();
    if let Some(error) = validate_update_appointment(&appointment) {
        return error;
    }

    // Updates accept different field names than create; only the update
    // convention is forwarded.
    let mut payload = Map::new();
    for key in ["starts_at", "ends_at", "notes"] {
        if let Some(value) = appointment.get(key) {
            payload.insert(key.to_string(), value.clone());
        }
    }

    match clinic
        .update(Resource::Appointment, &id, Value::Object(payload))
        .await
    {
        Ok(result) => wrap_updated_appointment(result),
        Err(e) => json!({
            "error": format!("Failed to update appointment: {e}"),
            "troubleshooting": "Ensure the appointment ID exists and you have permission to update it",
        }),
    }
}

const APPOINTMENT_BASE_FIELDS: [&str; 4] = [
    "patient_id",
    "practitioner_id",
    "appointment_type_id",
    "business_id",
];

/// Returns the validation-error payload for a `create_appointment` payload,
/// or `None` when the payload is acceptable.
fn validate_create_appointment(appointment: &Map<String, Value>) -> Option<Value> {
    let missing: Vec<&str> = APPOINTMENT_BASE_FIELDS
        .iter()
        .copied()
        .filter(|f| !appointment.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Some(json!({
            "error": format!("Missing required fields: {}", missing.join(", ")),
            "required_fields": APPOINTMENT_BASE_FIELDS,
            "time_field_options": ["appointment_start and appointment_end", "starts_at and ends_at"],
            "working_example": constants::appointment_example(),
            "defaults": constants::defaults(),
        }));
    }

    let has_appointment_time = appointment.contains_key("appointment_start")
        && appointment.contains_key("appointment_end");
    let has_starts_ends_time =
        appointment.contains_key("starts_at") && appointment.contains_key("ends_at");
    if !has_appointment_time && !has_starts_ends_time {
        return Some(json!({
            "error": "Missing time fields. Provide either (appointment_start and appointment_end) OR (starts_at and ends_at)",
            "option1": "appointment_start and appointment_end",
            "option2": "starts_at and ends_at",
            "required_format": "YYYY-MM-DDTHH:MM:SSZ",
            "example": "2025-09-05T10:00:00Z",
        }));
    }

    for field in APPOINTMENT_BASE_FIELDS {
        if let Some(error) = check_id_field(appointment, field) {
            return Some(error);
        }
    }

    let datetime_fields = if has_appointment_time {
        ["appointment_start", "appointment_end"]
    } else {
        ["starts_at", "ends_at"]
    };
    for field in datetime_fields {
        if let Some(error) = check_datetime_field(appointment, field) {
            return Some(error);
        }
    }

    None
}

/// Only the update-convention fields are checked, and only when present.
fn validate_update_appointment(appointment: &Map<String, Value>) -> Option<Value> {
    let mut validation_errors = Vec::new();
    for field in ["starts_at", "ends_at"] {
        if let Some(value) = appointment.get(field) {
            let invalid = match value.as_str() {
                Some(s) => validate::iso_datetime(s).is_err(),
                None => true,
            };
            if invalid {
                validation_errors
                    .push(format!("Invalid {field} format. Must be an ISO datetime with Z suffix."));
            }
        }
    }
    if validation_errors.is_empty() {
        return None;
    }
    Some(json!({
        "error": "Validation failed",
        "validation_errors": validation_errors,
        "required_format": "YYYY-MM-DDTHH:MM:SSZ",
        "correct_update_example": constants::appointment_update_example(),
    }))
}

fn check_id_field(payload: &Map<String, Value>, field: &str) -> Option<Value> {
    let value = payload.get(field)?;
    let reason = match value.as_str() {
        Some(s) => validate::id_format(s).err()?,
        None => "Must be a string of digits, not a number or other type.".to_string(),
    };
    Some(json!({
        "error": format!("Invalid {field} format. {reason}"),
        "received": value,
        "example": constants::EXAMPLE_PATIENT_ID,
    }))
}

fn check_datetime_field(payload: &Map<String, Value>, field: &str) -> Option<Value> {
    let value = payload.get(field)?;
    let reason = match value.as_str() {
        Some(s) => validate::iso_datetime(s).err()?,
        None => "Must be an ISO datetime string.".to_string(),
    };
    Some(json!({
        "error": format!("Invalid {field} format. {reason}"),
        "received": value,
        "required_format": "YYYY-MM-DDTHH:MM:SSZ",
        "example": "2025-09-05T10:00:00Z",
    }))
}

fn wrap_created_appointment(result: Value) -> Value {
    let Some(id) = result.get("id").cloned() else {
        return result;
    };
    let start = result
        .get("starts_at")
        .or_else(|| result.get("appointment_start"))
        .cloned()
        .unwrap_or(Value::Null);
    let end = result
        .get("ends_at")
        .or_else(|| result.get("appointment_end"))
        .cloned()
        .unwrap_or(Value::Null);
    json!({
        "success": true,
        "appointment_id": id,
        "patient_name": result.get("patient_name").cloned().unwrap_or_else(|| json!("Unknown")),
        "start_time": start,
        "end_time": end,
        "appointment": result,
    })
}

fn wrap_updated_appointment(result: Value) -> Value {
    let Some(id) = result.get("id").cloned() else {
        return result;
    };
    json!({
        "success": true,
        "appointment_id": id,
        "updated_start_time": result.get("starts_at").cloned().unwrap_or(Value::Null),
        "updated_end_time": result.get("ends_at").cloned().unwrap_or(Value::Null),
        "updated_at": result.get("updated_at").cloned().unwrap_or(Value::Null),
        "appointment": result,
    })
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_core::{PortError, PortResult};

    /// Echoes canned responses so dispatch behavior can be asserted without
    /// a remote API.
    struct MockClinic {
        fail: bool,
    }

    impl MockClinic {
        fn ok() -> Self {
            Self { fail: false }
        }

        fn failing() -> Self {
            Self { fail: true }
        }

        fn remote_error(&self) -> PortError {
            PortError::Remote {
                status: 500,
                body: "upstream exploded".to_string(),
            }
        }
    }

    #[async_trait]
    impl ClinicApi for MockClinic {
        async fn list(&self, _resource: Resource, query: &str) -> PortResult<Vec<Value>> {
            if self.fail {
                return Err(self.remote_error());
            }
            Ok(vec![json!({ "id": "12345678901", "matched": query })])
        }

        async fn get(&self, _resource: Resource, id: &str) -> PortResult<Value> {
            if self.fail {
                return Err(self.remote_error());
            }
            Ok(json!({ "id": id }))
        }

        async fn create(&self, _resource: Resource, payload: Value) -> PortResult<Value> {
            if self.fail {
                return Err(self.remote_error());
            }
            let mut object = payload.as_object().cloned().unwrap_or_default();
            object.insert("id".to_string(), json!("1764028746571981724"));
            Ok(Value::Object(object))
        }

        async fn update(&self, _resource: Resource, id: &str, payload: Value) -> PortResult<Value> {
            if self.fail {
                return Err(self.remote_error());
            }
            let mut object = payload.as_object().cloned().unwrap_or_default();
            object.insert("id".to_string(), json!(id));
            Ok(Value::Object(object))
        }

        async fn delete(&self, _resource: Resource, _id: &str) -> PortResult<Value> {
            if self.fail {
                return Err(self.remote_error());
            }
            Ok(json!({ "deleted": true }))
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn create_appointment_lists_missing_base_fields_and_time_options() {
        let error = validate_create_appointment(&obj(json!({
            "patient_id": "1764028746571981724",
        })))
        .expect("validation error");

        let message = error["error"].as_str().unwrap();
        assert!(message.contains("practitioner_id"));
        assert!(message.contains("appointment_type_id"));
        assert!(message.contains("business_id"));
        assert!(!message.contains("patient_id"));
        let options = error["time_field_options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert!(error.get("working_example").is_some());
        assert!(error.get("defaults").is_some());
    }

    #[test]
    fn create_appointment_requires_one_time_convention() {
        let error = validate_create_appointment(&obj(json!({
            "patient_id": "1764028746571981724",
            "practitioner_id": "1752849161776013508",
            "appointment_type_id": "1752849165005627509",
            "business_id": "1752849165332784051",
        })))
        .expect("validation error");

        assert!(error["error"].as_str().unwrap().contains("Missing time fields"));
        assert!(error.get("option1").is_some());
        assert!(error.get("option2").is_some());
    }

    #[test]
    fn create_appointment_accepts_alternate_time_fields() {
        let outcome = validate_create_appointment(&obj(json!({
            "patient_id": "1764028746571981724",
            "practitioner_id": "1752849161776013508",
            "appointment_type_id": "1752849165005627509",
            "business_id": "1752849165332784051",
            "starts_at": "2025-09-05T10:00:00Z",
            "ends_at": "2025-09-05T11:00:00Z",
        })));

        assert!(outcome.is_none());
    }

    #[test]
    fn create_appointment_names_the_offending_id_field() {
        let error = validate_create_appointment(&obj(json!({
            "patient_id": "1764028746571981724",
            "practitioner_id": "123",
            "appointment_type_id": "1752849165005627509",
            "business_id": "1752849165332784051",
            "starts_at": "2025-09-05T10:00:00Z",
            "ends_at": "2025-09-05T11:00:00Z",
        })))
        .expect("validation error");

        assert!(error["error"].as_str().unwrap().contains("practitioner_id"));
        assert_eq!(error["received"], json!("123"));
    }

    #[test]
    fn create_appointment_names_the_offending_datetime_field() {
        let error = validate_create_appointment(&obj(json!({
            "patient_id": "1764028746571981724",
            "practitioner_id": "1752849161776013508",
            "appointment_type_id": "1752849165005627509",
            "business_id": "1752849165332784051",
            "appointment_start": "2025-09-05 10:00:00",
            "appointment_end": "2025-09-05T11:00:00Z",
        })))
        .expect("validation error");

        assert!(error["error"].as_str().unwrap().contains("appointment_start"));
        assert_eq!(error["required_format"], json!("YYYY-MM-DDTHH:MM:SSZ"));
    }

    #[test]
    fn update_appointment_checks_only_present_fields() {
        assert!(validate_update_appointment(&obj(json!({ "notes": "rescheduled" }))).is_none());

        let error = validate_update_appointment(&obj(json!({
            "ends_at": "2025-09-07T15:00:00",
        })))
        .expect("validation error");
        let reasons = error["validation_errors"].as_array().unwrap();
        assert!(reasons[0].as_str().unwrap().contains("ends_at"));
    }

    #[test]
    fn create_patient_minimal_passes_validation() {
        assert!(validate_create_patient(&obj(json!({
            "first_name": "John",
            "last_name": "Smith",
        })))
        .is_none());
    }

    #[test]
    fn create_patient_rejects_empty_first_name() {
        let error = validate_create_patient(&obj(json!({
            "first_name": "",
            "last_name": "Smith",
        })))
        .expect("validation error");
        assert!(error["error"].as_str().unwrap().contains("first_name"));
    }

    #[test]
    fn create_patient_rejects_whitespace_only_name() {
        let error = validate_create_patient(&obj(json!({
            "first_name": "   ",
            "last_name": "Smith",
        })))
        .expect("validation error");
        let reasons = error["validation_errors"].as_array().unwrap();
        assert!(reasons.iter().any(|r| r.as_str().unwrap().contains("first_name cannot be empty")));
    }

    #[test]
    fn create_patient_validates_optional_fields_when_present() {
        let error = validate_create_patient(&obj(json!({
            "first_name": "John",
            "last_name": "Smith",
            "email": "not-an-email",
            "date_of_birth": "15/03/1985",
        })))
        .expect("validation error");
        let reasons = error["validation_errors"].as_array().unwrap();
        assert_eq!(reasons.len(), 2);
    }

    #[tokio::test]
    async fn dispatch_create_patient_augments_patient_name() {
        let clinic = MockClinic::ok();
        let response = dispatch(
            &clinic,
            "create_patient",
            &json!({ "patient": { "first_name": "John", "last_name": "Smith" } }),
        )
        .await;

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["patient_name"], json!("John Smith"));
        assert_eq!(response["patient"]["first_name"], json!("John"));
    }

    #[tokio::test]
    async fn dispatch_delete_patient_wraps_confirmation() {
        let clinic = MockClinic::ok();
        let response = dispatch(
            &clinic,
            "delete_patient",
            &json!({ "patient_id": "1764041171115451305" }),
        )
        .await;

        assert_eq!(response["success"], json!(true));
        assert!(response["message"].as_str().unwrap().contains("archived"));
        assert_eq!(response["result"]["deleted"], json!(true));
    }

    #[tokio::test]
    async fn dispatch_list_wraps_items_in_resource_envelope() {
        let clinic = MockClinic::ok();
        let response = dispatch(&clinic, "list_patients", &json!({})).await;
        assert!(response["patients"].is_array());
    }

    #[tokio::test]
    async fn dispatch_get_patient_rejects_short_id_before_remote_call() {
        let clinic = MockClinic::failing();
        let response = dispatch(&clinic, "get_patient", &json!({ "patient_id": "123" })).await;
        // The failing mock was never reached: the payload is the validation
        // error, not the remote error.
        assert!(response["error"].as_str().unwrap().contains("patient_id"));
        assert!(!response["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn dispatch_coerces_integer_ids() {
        let clinic = MockClinic::ok();
        let response = dispatch(
            &clinic,
            "get_appointment",
            &json!({ "appointment_id": 1764041108192502241u64 }),
        )
        .await;
        assert_eq!(response["id"], json!("1764041108192502241"));
    }

    #[tokio::test]
    async fn dispatch_normalizes_remote_errors() {
        let clinic = MockClinic::failing();
        let response = dispatch(
            &clinic,
            "get_patient",
            &json!({ "patient_id": "1764041171115451305" }),
        )
        .await;
        let message = response["error"].as_str().unwrap();
        assert!(message.contains("500"));
        assert!(message.contains("upstream exploded"));
    }

    #[tokio::test]
    async fn dispatch_update_appointment_forwards_only_update_fields() {
        let clinic = MockClinic::ok();
        let response = dispatch(
            &clinic,
            "update_appointment",
            &json!({
                "appointment_id": "1764041108192502241",
                "appointment": {
                    "starts_at": "2025-09-07T14:00:00Z",
                    "ends_at": "2025-09-07T15:00:00Z",
                    "appointment_start": "2025-09-07T14:00:00Z",
                },
            }),
        )
        .await;

        assert_eq!(response["success"], json!(true));
        // The create-convention field was dropped before the remote call.
        assert!(response["appointment"].get("appointment_start").is_none());
        assert_eq!(response["updated_start_time"], json!("2025-09-07T14:00:00Z"));
    }

    #[tokio::test]
    async fn dispatch_invoice_tools_pass_through_without_validation() {
        let clinic = MockClinic::ok();
        // A short ID that patient/appointment tools would reject.
        let response = dispatch(&clinic, "get_invoice", &json!({ "invoice_id": "42" })).await;
        assert_eq!(response["id"], json!("42"));
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_lists_available_tools() {
        let clinic = MockClinic::ok();
        let response = dispatch(&clinic, "teleport_patient", &json!({})).await;
        assert!(response["error"].as_str().unwrap().contains("Unknown tool"));
        let available = response["available_tools"].as_array().unwrap();
        assert_eq!(available.len(), TOOLS.len());
    }
}
