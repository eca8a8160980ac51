//! Domain configuration.

use ocap_marshal_core::{random_capability, MarshalError, Result};

/// Capability id length, in random bytes, for newly minted tokens.
pub const DEFAULT_CAPABILITY_BYTES: usize = 42;

/// Shortest capability id accepted by [`DomainConfig::validate`].
pub const MIN_CAPABILITY_BYTES: usize = 16;

/// Configuration for a [`crate::Domain`].
#[derive(Debug, Clone)]
pub struct DomainConfig {
    /// Domain name. Generated as `{name_scheme}://{capability}/` if absent.
    pub name: Option<String>,
    /// Scheme used for generated names.
    pub name_scheme: String,
    /// Random bytes per capability id.
    pub capability_bytes: usize,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: None,
            name_scheme: "ocap".to_string(),
            capability_bytes: DEFAULT_CAPABILITY_BYTES,
        }
    }
}

impl DomainConfig {
    /// Configuration with a fixed name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.is_empty() || name.contains('#') {
                return Err(MarshalError::InvalidConfig(format!(
                    "domain name must be non-empty and free of '#': {name:?}"
                )));
            }
        }
        if self.name_scheme.is_empty() || self.name_scheme.contains('#') {
            return Err(MarshalError::InvalidConfig(format!(
                "name scheme must be non-empty and free of '#': {:?}",
                self.name_scheme
            )));
        }
        if self.capability_bytes < MIN_CAPABILITY_BYTES {
            return Err(MarshalError::InvalidConfig(format!(
                "capability_bytes must be at least {MIN_CAPABILITY_BYTES}, got {}",
                self.capability_bytes
            )));
        }
        Ok(())
    }

    /// The configured name, or a freshly generated one.
    pub(crate) fn resolve_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "{}://{}/",
                self.name_scheme,
                random_capability(self.capability_bytes)
            ),
        }
    }
}
