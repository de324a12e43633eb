//! Attribute schemas
//!
//! A [`Schema`] declares the attributes a resource or data source accepts and
//! produces. It drives configuration validation, defaults, plan diffs
//! (update vs. replace) and redaction of sensitive values.

use crate::data::{Attributes, is_zero};
use crate::error::{ProviderError, Result};
use crate::timeouts::TIMEOUTS_KEY;
use serde_json::Value;

/// Placeholder printed instead of sensitive values
pub const REDACTED: &str = "(sensitive)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Int,
    Bool,
    List,
}

impl AttrType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            AttrType::String => value.is_string(),
            AttrType::Int => value.is_i64() || value.is_u64(),
            AttrType::Bool => value.is_boolean(),
            AttrType::List => value.is_array(),
        }
    }
}

impl std::fmt::Display for AttrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrType::String => write!(f, "string"),
            AttrType::Int => write!(f, "int"),
            AttrType::Bool => write!(f, "bool"),
            AttrType::List => write!(f, "list"),
        }
    }
}

/// Element type of a list attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Elem {
    Scalar(AttrType),
    Block(Vec<Attribute>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttrType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub description: &'static str,
    pub elem: Option<Elem>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttrType) -> Self {
        Self {
            name,
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: "",
            elem: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttrType::String)
    }

    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttrType::Int)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttrType::Bool)
    }

    /// List of scalars
    pub fn list(name: &'static str, elem: AttrType) -> Self {
        let mut attr = Self::new(name, AttrType::List);
        attr.elem = Some(Elem::Scalar(elem));
        attr
    }

    /// List of nested blocks
    pub fn blocks(name: &'static str, fields: Vec<Attribute>) -> Self {
        let mut attr = Self::new(name, AttrType::List);
        attr.elem = Some(Elem::Block(fields));
        attr
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.optional = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Computed and never accepted from configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    fn check(&self, path: &str, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        if !self.kind.accepts(value) {
            return Err(ProviderError::invalid(
                path,
                format!("expected {}, got {}", self.kind, value),
            ));
        }
        let (Some(elem), Some(items)) = (&self.elem, value.as_array()) else {
            return Ok(());
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}.{}", path, i);
            match elem {
                Elem::Scalar(kind) => {
                    if !kind.accepts(item) {
                        return Err(ProviderError::invalid(
                            item_path,
                            format!("expected {}, got {}", kind, item),
                        ));
                    }
                }
                Elem::Block(fields) => {
                    let map = item.as_object().ok_or_else(|| {
                        ProviderError::invalid(&item_path, "expected an object")
                    })?;
                    validate_fields(fields, map, &format!("{}.", item_path))?;
                }
            }
        }
        Ok(())
    }
}

fn validate_fields(fields: &[Attribute], config: &Attributes, prefix: &str) -> Result<()> {
    for (key, value) in config {
        let path = format!("{}{}", prefix, key);
        let attr = fields
            .iter()
            .find(|a| a.name == key)
            .ok_or_else(|| ProviderError::invalid(&path, "unknown attribute"))?;
        if attr.is_read_only() && !value.is_null() {
            return Err(ProviderError::invalid(
                &path,
                "computed attribute cannot be configured",
            ));
        }
        attr.check(&path, value)?;
    }
    for attr in fields.iter().filter(|a| a.required) {
        if config.get(attr.name).is_none_or(Value::is_null) {
            return Err(ProviderError::MissingAttribute(format!(
                "{}{}",
                prefix, attr.name
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &'static str, attributes: Vec<Attribute>) -> Self {
        Self {
            description,
            attributes,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check configuration against the declared attributes
    ///
    /// The `timeouts` block is not part of the schema and is skipped here.
    pub fn validate(&self, config: &Attributes) -> Result<()> {
        let mut config = config.clone();
        config.remove(TIMEOUTS_KEY);
        validate_fields(&self.attributes, &config, "")
    }

    pub fn apply_defaults(&self, config: &mut Attributes) {
        for attr in &self.attributes {
            if let Some(default) = &attr.default {
                let unset = config.get(attr.name).is_none_or(Value::is_null);
                if unset {
                    config.insert(attr.name.to_string(), default.clone());
                }
            }
        }
    }

    /// Planned state for an update: configured attributes replace prior
    /// ones, computed attributes keep their prior value unless configured
    pub fn plan(&self, prior: &Attributes, config: &Attributes) -> Attributes {
        let mut planned = prior.clone();
        for attr in &self.attributes {
            match config.get(attr.name) {
                Some(value) if !attr.is_read_only() => {
                    planned.insert(attr.name.to_string(), value.clone());
                }
                _ if attr.computed => {}
                _ => {
                    planned.remove(attr.name);
                }
            }
        }
        planned
    }

    /// Force-new attributes whose planned value differs from the prior one
    pub fn requires_replacement(&self, prior: &Attributes, planned: &Attributes) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.force_new && !a.is_read_only())
            .filter(|a| differs(prior.get(a.name), planned.get(a.name)))
            .map(|a| a.name)
            .collect()
    }

    /// Configurable attributes whose planned value differs from the prior one
    pub fn changed(&self, prior: &Attributes, planned: &Attributes) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| !a.is_read_only())
            .filter(|a| differs(prior.get(a.name), planned.get(a.name)))
            .map(|a| a.name)
            .collect()
    }

    /// Copy of `attributes` with sensitive values masked
    pub fn redact(&self, attributes: &Attributes) -> Attributes {
        let mut redacted = attributes.clone();
        for attr in self.attributes.iter().filter(|a| a.sensitive) {
            if let Some(value) = redacted.get_mut(attr.name) {
                if !value.is_null() {
                    *value = Value::String(REDACTED.to_string());
                }
            }
        }
        redacted
    }
}

/// Values differ unless both are unset (absent, null or zero) or equal
fn differs(prior: Option<&Value>, planned: Option<&Value>) -> bool {
    let unset = |v: Option<&Value>| v.is_none_or(is_zero);
    match (unset(prior), unset(planned)) {
        (true, true) => false,
        _ => prior != planned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn volume_schema() -> Schema {
        Schema::new(
            "test volume",
            vec![
                Attribute::string("project_id").required(),
                Attribute::string("name").optional().force_new(),
                Attribute::int("size").required(),
                Attribute::string("password").optional().sensitive(),
                Attribute::int("bandwidth").default_value(100),
                Attribute::string("status").computed(),
                Attribute::blocks(
                    "block_device",
                    vec![
                        Attribute::bool("bootable").required(),
                        Attribute::int("size").required(),
                    ],
                )
                .optional()
                .force_new(),
                Attribute::list("keypairs", AttrType::String).optional(),
            ],
        )
    }

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate_accepts_good_config() {
        let config = attrs(json!({
            "project_id": "p1",
            "size": 10,
            "block_device": [{"bootable": true, "size": 20}],
            "keypairs": ["k1"],
            "timeouts": {"create": "5m"}
        }));
        volume_schema().validate(&config).unwrap();
    }

    #[test]
    fn test_validate_reports_problems() {
        let schema = volume_schema();

        let missing = schema.validate(&attrs(json!({"size": 10}))).unwrap_err();
        assert_eq!(missing.to_string(), "Missing required attribute: project_id");

        let wrong_type = schema
            .validate(&attrs(json!({"project_id": "p1", "size": "10"})))
            .unwrap_err();
        assert!(wrong_type.to_string().contains("size"));

        let unknown = schema
            .validate(&attrs(json!({"project_id": "p1", "size": 10, "color": "red"})))
            .unwrap_err();
        assert!(unknown.to_string().contains("unknown attribute"));

        let computed = schema
            .validate(&attrs(json!({"project_id": "p1", "size": 10, "status": "x"})))
            .unwrap_err();
        assert!(computed.to_string().contains("computed"));

        let nested = schema
            .validate(&attrs(json!({
                "project_id": "p1",
                "size": 10,
                "block_device": [{"bootable": true}]
            })))
            .unwrap_err();
        assert_eq!(
            nested.to_string(),
            "Missing required attribute: block_device.0.size"
        );

        let bad_elem = schema
            .validate(&attrs(json!({"project_id": "p1", "size": 10, "keypairs": [1]})))
            .unwrap_err();
        assert!(bad_elem.to_string().contains("keypairs.0"));
    }

    #[test]
    fn test_defaults_fill_unset_only() {
        let schema = volume_schema();
        let mut config = attrs(json!({"project_id": "p1", "size": 10}));
        schema.apply_defaults(&mut config);
        assert_eq!(config["bandwidth"], json!(100));

        let mut explicit = attrs(json!({"bandwidth": 1024}));
        schema.apply_defaults(&mut explicit);
        assert_eq!(explicit["bandwidth"], json!(1024));
    }

    #[test]
    fn test_plan_keeps_computed_and_drops_removed() {
        let schema = volume_schema();
        let prior = attrs(json!({
            "id": "vol-1",
            "project_id": "p1",
            "size": 10,
            "password": "old",
            "status": "AVAILABLE"
        }));
        let config = attrs(json!({"project_id": "p1", "size": 20}));

        let planned = schema.plan(&prior, &config);
        assert_eq!(planned["size"], json!(20));
        assert_eq!(planned["status"], json!("AVAILABLE"));
        assert_eq!(planned["id"], json!("vol-1"));
        assert!(!planned.contains_key("password"));
        assert_eq!(schema.changed(&prior, &planned), vec!["size", "password"]);
    }

    #[test]
    fn test_requires_replacement() {
        let schema = volume_schema();
        let prior = attrs(json!({"project_id": "p1", "size": 10, "name": "a"}));

        let resized = attrs(json!({"project_id": "p1", "size": 20, "name": "a"}));
        assert!(schema.requires_replacement(&prior, &resized).is_empty());

        let renamed = attrs(json!({"project_id": "p1", "size": 10, "name": "b"}));
        assert_eq!(schema.requires_replacement(&prior, &renamed), vec!["name"]);

        let unset = attrs(json!({"project_id": "p1", "size": 10, "name": ""}));
        let no_name = attrs(json!({"project_id": "p1", "size": 10}));
        assert!(schema.requires_replacement(&unset, &no_name).is_empty());
    }

    #[test]
    fn test_redact() {
        let schema = volume_schema();
        let redacted = schema.redact(&attrs(json!({"password": "hunter2", "size": 10})));
        assert_eq!(redacted["password"], json!(REDACTED));
        assert_eq!(redacted["size"], json!(10));
    }
}
