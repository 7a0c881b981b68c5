//! Schemas authored as JSON or YAML documents
//!
//! ```yaml
//! payment:
//!   type: number
//!   props: { placeholder: Payment (ETH) }
//!   validate: [required, number]
//! timeout:
//!   type: number
//!   visibleIf: payment
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{FieldDescriptor, FieldOptions, Schema, WizardSchema};
use crate::error::{FormError, FormResult};
use crate::validate::{ValidatorRef, ValidatorRegistry};
use crate::visibility::VisibilityCondition;

/// A field descriptor as written in a document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDocument {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<ValidatorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibilityCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_values: Option<String>,
}

/// Field key → field document
pub type SchemaDocument = IndexMap<String, FieldDocument>;

/// Page key → page document
pub type WizardDocument = IndexMap<String, SchemaDocument>;

impl FieldDocument {
    /// Resolve validator references into a descriptor
    pub fn into_descriptor(self, registry: &ValidatorRegistry) -> FormResult<FieldDescriptor> {
        Ok(FieldDescriptor {
            validate: registry.resolve_all(&self.validate)?,
            field_type: self.field_type,
            props: self.props,
            visible_if: self.visible_if,
            form_values: self.form_values,
            options: FieldOptions::default(),
        })
    }
}

impl Schema {
    pub fn from_document(document: SchemaDocument, registry: &ValidatorRegistry) -> FormResult<Self> {
        document
            .into_iter()
            .map(|(key, field)| Ok::<_, FormError>((key, field.into_descriptor(registry)?)))
            .collect()
    }

    pub fn from_json_str(source: &str, registry: &ValidatorRegistry) -> FormResult<Self> {
        let document: SchemaDocument = serde_json::from_str(source)?;
        debug!(fields = document.len(), "Parsed JSON schema document");
        Self::from_document(document, registry)
    }

    pub fn from_yaml_str(source: &str, registry: &ValidatorRegistry) -> FormResult<Self> {
        let document: SchemaDocument = serde_yaml::from_str(source)?;
        debug!(fields = document.len(), "Parsed YAML schema document");
        Self::from_document(document, registry)
    }
}

impl WizardSchema {
    pub fn from_document(document: WizardDocument, registry: &ValidatorRegistry) -> FormResult<Self> {
        document
            .into_iter()
            .map(|(key, page)| Ok::<_, FormError>((key, Schema::from_document(page, registry)?)))
            .collect()
    }

    pub fn from_json_str(source: &str, registry: &ValidatorRegistry) -> FormResult<Self> {
        let document: WizardDocument = serde_json::from_str(source)?;
        debug!(pages = document.len(), "Parsed JSON wizard document");
        Self::from_document(document, registry)
    }

    pub fn from_yaml_str(source: &str, registry: &ValidatorRegistry) -> FormResult<Self> {
        let document: WizardDocument = serde_yaml::from_str(source)?;
        debug!(pages = document.len(), "Parsed YAML wizard document");
        Self::from_document(document, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::FormValues;
    use serde_json::json;

    const YAML: &str = r#"
payment:
  type: number
  props:
    placeholder: Payment (ETH)
  validate: [required, number]
timeout:
  type: number
  visibleIf: payment
  validate:
    - required
    - min_length: 2
partyB:
  type: text
  visibleIf: "!payment"
  formValues: arbitratorExtraData
"#;

    #[test]
    fn test_yaml_schema() {
        let schema = Schema::from_yaml_str(YAML, &ValidatorRegistry::new()).unwrap();

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["payment", "timeout", "partyB"]);
        let payment = schema.get("payment").unwrap();
        assert_eq!(payment.field_type, "number");
        assert_eq!(payment.validate.len(), 2);
        assert_eq!(payment.props.get("placeholder"), Some(&json!("Payment (ETH)")));

        let party_b = schema.get("partyB").unwrap();
        assert_eq!(party_b.visible_if, Some(VisibilityCondition::parse("!payment")));
        assert_eq!(party_b.form_values.as_deref(), Some("arbitratorExtraData"));
    }

    #[test]
    fn test_json_wizard_keeps_page_order() {
        let source = r#"{
            "step2": { "email": { "type": "email", "validate": ["email"] } },
            "step1": { "name": { "type": "text" } }
        }"#;
        let wizard = WizardSchema::from_json_str(source, &ValidatorRegistry::new()).unwrap();
        assert_eq!(wizard.keys().collect::<Vec<_>>(), vec!["step2", "step1"]);

        let (_, first) = wizard.iter().next().unwrap();
        let validator = crate::validate::resolve_validators("Email", &first.get("email").unwrap().validate);
        assert_eq!(
            validator.validate(&json!("nope"), &FormValues::new()),
            Some("Email must be a valid email address.".to_string())
        );
    }

    #[test]
    fn test_unknown_validator_fails() {
        let source = r#"{ "a": { "type": "text", "validate": ["even"] } }"#;
        let err = Schema::from_json_str(source, &ValidatorRegistry::new()).err();
        assert!(matches!(err, Some(FormError::UnknownValidator(name)) if name == "even"));
    }

    #[test]
    fn test_malformed_descriptor_fails() {
        let source = r#"{ "a": { "type": "text", "visible": "b" } }"#;
        let err = Schema::from_json_str(source, &ValidatorRegistry::new()).err();
        assert!(matches!(err, Some(FormError::Parse(_))));

        let missing_type = r#"{ "a": { "props": {} } }"#;
        assert!(Schema::from_json_str(missing_type, &ValidatorRegistry::new()).is_err());
    }

    #[test]
    fn test_bad_pattern_fails() {
        let source = r#"{ "a": { "type": "text", "validate": [{ "pattern": "(" }] } }"#;
        let err = Schema::from_json_str(source, &ValidatorRegistry::new()).err();
        assert!(matches!(err, Some(FormError::InvalidPattern { .. })));
    }
}
