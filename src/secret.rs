//! Credential bundles supplied by the external secret store.
//!
//! A [`Secret`] is a flat mapping of credential fields (`username`,
//! `password`, `domain`, `instance`, `api_key`, `key`, ...). Which fields are
//! required depends on the connector. Secrets are resolved by name through a
//! [`SecretProvider`] and never persisted by this crate.
//!
//! # Security
//! - `Debug` output lists field names only, never values
//! - Never include secret values in log lines or error messages

use crate::error::ConnectorError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret {
    fields: BTreeMap<String, String>,
}

impl Secret {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion, mostly for tests and config.
    #[must_use]
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.fields.insert(field.to_string(), value.to_string());
        self
    }

    /// Non-empty field value, or `None`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Fails with a validation error naming the first missing field.
    pub fn require(&self, fields: &[&str]) -> Result<(), ConnectorError> {
        match fields.iter().find(|f| self.get(f).is_none()) {
            Some(missing) => Err(ConnectorError::MissingSecretField(missing.to_string())),
            None => Ok(()),
        }
    }

    pub fn field(&self, field: &str) -> Result<&str, ConnectorError> {
        self.get(field)
            .ok_or_else(|| ConnectorError::MissingSecretField(field.to_string()))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves named secret references to credential bundles.
pub trait SecretProvider: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Secret>;
}

/// In-memory secret provider, populated from host configuration.
#[derive(Clone, Debug, Default)]
pub struct SecretStore {
    secrets: HashMap<String, Secret>,
}

impl SecretStore {
    pub fn new(secrets: HashMap<String, Secret>) -> Self {
        Self { secrets }
    }

    pub fn insert(&mut self, name: &str, secret: Secret) {
        self.secrets.insert(name.to_string(), secret);
    }

    /// Secret names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.secrets.keys().cloned().collect();
        names.sort();
        names
    }
}

impl SecretProvider for SecretStore {
    fn resolve(&self, name: &str) -> Option<Secret> {
        self.secrets.get(name).cloned()
    }
}
