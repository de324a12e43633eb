//! Per-operation timeouts
//!
//! Every resource carries create/read/update/delete budgets. A `timeouts`
//! block in the resource configuration overrides them with humantime
//! strings:
//!
//! ```json
//! { "size": 20, "timeouts": { "create": "45m", "delete": "15m" } }
//! ```

use crate::error::{ProviderError, Result};
use serde_json::Value;
use std::time::Duration;

/// Configuration key holding timeout overrides
pub const TIMEOUTS_KEY: &str = "timeouts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(60),
            update: Duration::from_secs(10 * 60),
            delete: Duration::from_secs(10 * 60),
        }
    }
}

impl Timeouts {
    /// Apply overrides from a `timeouts` block, if any
    pub fn with_overrides(mut self, block: Option<&Value>) -> Result<Self> {
        let Some(block) = block else {
            return Ok(self);
        };
        if block.is_null() {
            return Ok(self);
        }
        let map = block.as_object().ok_or_else(|| {
            ProviderError::invalid(TIMEOUTS_KEY, "expected an object of duration strings")
        })?;

        for (op, value) in map {
            let slot = match op.as_str() {
                "create" => &mut self.create,
                "read" => &mut self.read,
                "update" => &mut self.update,
                "delete" => &mut self.delete,
                other => {
                    return Err(ProviderError::invalid(
                        format!("{}.{}", TIMEOUTS_KEY, other),
                        "unknown operation",
                    ));
                }
            };
            let text = value.as_str().ok_or_else(|| {
                ProviderError::invalid(format!("{}.{}", TIMEOUTS_KEY, op), "expected a string")
            })?;
            *slot = humantime::parse_duration(text).map_err(|e| {
                ProviderError::invalid(format!("{}.{}", TIMEOUTS_KEY, op), e.to_string())
            })?;
        }
        Ok(self)
    }
}
