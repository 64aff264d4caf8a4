//! # Configuration Store
//!
//! Resolved parameter values are cached between invocations so the user is
//! only asked once. The [`ConfigStore`] trait is the whole persistence
//! contract: flat string values, addressed by namespace and parameter id.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage, a single JSON file opened lazily
//!   and rewritten on every `put`.
//! - [`memory::InMemoryStore`]: No persistence, for tests.
//!
//! ## Namespaces
//!
//! A parameter without a dependency lives in the `DEFAULT` namespace. A
//! parameter that depends on another lives in `"<dependency id>=<value>"`, so
//! the image cached for `device_type=panda` never leaks into a beaglebone job:
//!
//! ```text
//! {
//!   "DEFAULT": { "device_type": "panda", "server": "validation.example.org" },
//!   "device_type=panda": { "prebuilt_image": "/images/panda.img" },
//!   "server=validation.example.org": { "rpc_endpoint": "RPC2" }
//! }
//! ```
//!
//! Values are always stored serialized; only the parameter knows how to turn
//! them back into structured values.

use crate::error::{LavaError, Result};
use crate::parameter::{ParamRef, ParamValue, ParameterSet};

pub mod fs;
pub mod memory;

pub const DEFAULT_NAMESPACE: &str = "DEFAULT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

pub trait ConfigStore {
    /// Raw serialized value, or `None` when nothing is stored under `key`.
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    /// Stores a serialized value. Must be durable when this returns.
    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<()>;

    /// Every stored value, ordered by namespace then key.
    fn entries(&self) -> Result<Vec<StoredEntry>>;

    /// Cached serialized value of a parameter, looked up in its namespace.
    fn get_from_backend(&self, params: &ParameterSet, param: ParamRef) -> Result<Option<String>> {
        let namespace = namespace_for(params, param);
        self.get(&namespace, &params[param].id)
    }

    /// Serializes `value` (or the parameter's own value) into the store.
    fn put_parameter(
        &mut self,
        params: &ParameterSet,
        param: ParamRef,
        value: Option<&ParamValue>,
    ) -> Result<()> {
        let parameter = &params[param];
        let value = value.or(parameter.value.as_ref()).ok_or_else(|| {
            LavaError::Configuration(format!("'{}' has no value to store", parameter.id))
        })?;
        let namespace = namespace_for(params, param);
        self.put(&namespace, &parameter.id, &parameter.serialize(value))
    }
}

/// Namespace a parameter's value is cached under, given the current value of
/// its dependency.
pub fn namespace_for(params: &ParameterSet, param: ParamRef) -> String {
    let Some(dependency) = params[param].depends else {
        return DEFAULT_NAMESPACE.to_string();
    };
    let dependency = &params[dependency];
    let value = dependency
        .value
        .as_ref()
        .map(|v| dependency.serialize(v))
        .unwrap_or_default();
    format!("{}={}", dependency.id, value)
}
