//! Attribute model shared by resources and data sources
//!
//! [`ResourceData`] holds two attribute maps: the prior state (what was last
//! persisted) and the working state (the planned configuration, updated by
//! handlers with computed values). Change detection compares the two.

use crate::error::{ProviderError, Result};
use crate::timeouts::Timeouts;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Attribute name to JSON value
pub type Attributes = Map<String, Value>;

/// Attribute holding the entity identifier
pub const ID_KEY: &str = "id";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    prior: Attributes,
    state: Attributes,
    timeouts: Timeouts,
}

impl ResourceData {
    /// Fresh data for a create or a data source read
    pub fn new(config: Attributes) -> Self {
        Self {
            id: None,
            prior: Attributes::new(),
            state: config,
            timeouts: Timeouts::default(),
        }
    }

    /// Data for an entity that already exists, prior and working state equal
    pub fn from_state(id: impl Into<String>, attributes: Attributes) -> Self {
        Self::planned(id, attributes.clone(), attributes)
    }

    /// Data for an update: `planned` is compared against `prior`
    pub fn planned(id: impl Into<String>, mut prior: Attributes, planned: Attributes) -> Self {
        let id = id.into();
        prior.insert(ID_KEY.to_string(), Value::String(id.clone()));
        let mut data = Self {
            id: None,
            prior,
            state: planned,
            timeouts: Timeouts::default(),
        };
        data.set_id(id);
        data
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id, or a state error for data that was never created
    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| ProviderError::State("resource has no id".to_string()))
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.state.insert(ID_KEY.to_string(), Value::String(id.clone()));
        self.id = Some(id);
    }

    /// Typed value of an attribute; `None` when absent, null or of another type
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        decode(self.state.get(key)?)
    }

    /// Like [`get`](Self::get), but zero values (`""`, `0`, `false`, empty
    /// collections) also count as unset
    pub fn get_ok<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.state.get(key)?;
        if is_zero(value) {
            return None;
        }
        decode(value)
    }

    /// Typed value from the prior state
    pub fn prior<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        decode(self.prior.get(key)?)
    }

    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get(key)
            .ok_or_else(|| ProviderError::MissingAttribute(key.to_string()))
    }

    /// A non-empty string attribute
    pub fn require_str(&self, key: &str) -> Result<String> {
        self.get_ok::<String>(key)
            .ok_or_else(|| ProviderError::MissingAttribute(key.to_string()))
    }

    pub fn has_change(&self, key: &str) -> bool {
        normalized(self.prior.get(key)) != normalized(self.state.get(key))
    }

    pub fn has_changes(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.has_change(k))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.state.insert(key.to_string(), value.into());
    }

    pub fn attributes(&self) -> &Attributes {
        &self.state
    }

    pub fn prior_attributes(&self) -> &Attributes {
        &self.prior
    }

    pub fn into_attributes(self) -> Attributes {
        self.state
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

fn normalized(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Whether a value is the zero value of its type
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
