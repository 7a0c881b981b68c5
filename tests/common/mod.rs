#![allow(dead_code)]

use schemaform::{validators, FieldDescriptor, FormValues, Schema, ValidatorSpec};
use serde_json::{json, Value};

/// Route library logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("schemaform=debug")
        .with_test_writer()
        .try_init();
}

pub fn values(pairs: &[(&str, Value)]) -> FormValues {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn validated(field_type: &str, validate: &[ValidatorSpec]) -> FieldDescriptor {
    validate
        .iter()
        .cloned()
        .fold(FieldDescriptor::new(field_type), |descriptor, spec| descriptor.validate(spec))
}

/// The contract form: payment gates timeout, email gates partyB
pub fn contract_schema(suffix: &str) -> Schema {
    let required_number = [validators::required(), validators::number()];
    let numbers: &[ValidatorSpec] = if suffix.is_empty() { &required_number } else { &[] };

    Schema::new()
        .field(
            format!("payment{}", suffix),
            validated("number", numbers).placeholder("Payment (ETH)"),
        )
        .field(
            format!("timeout{}", suffix),
            validated("number", numbers).visible_if("payment"),
        )
        .field(
            format!("partyB{}", suffix),
            FieldDescriptor::new("text")
                .form_values("arbitratorExtraData")
                .visible_if("email"),
        )
        .field(
            format!("arbitratorExtraData{}", suffix),
            FieldDescriptor::new("text").visible_if("!payment"),
        )
        .field(format!("email{}", suffix), FieldDescriptor::new("text"))
        .field(
            format!("description{}", suffix),
            FieldDescriptor::new("text").prop("style", json!({ "flex": 2 })),
        )
}
