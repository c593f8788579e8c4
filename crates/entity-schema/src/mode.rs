//! Validation strictness.
//!
//! The only difference between the two modes is how undeclared keys are
//! treated: development builds reject them, production builds tolerate them so
//! that records produced by a newer remote schema still validate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseModeError;

/// Environment variable consulted by [`ValidationMode::from_env`].
pub const MODE_ENV_VAR: &str = "ENTITY_VALIDATION_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Undeclared keys are a violation.
    Development,
    /// Undeclared keys are ignored.
    Production,
}

impl ValidationMode {
    /// The mode implied by the build profile alone.
    pub const fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Reads [`MODE_ENV_VAR`], falling back to [`ValidationMode::for_build`]
    /// when it is unset or unparsable.
    ///
    /// Meant to be called once by the application; library code takes the
    /// mode as a parameter.
    pub fn from_env() -> Self {
        match std::env::var(MODE_ENV_VAR) {
            Ok(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(%err, "falling back to build-profile validation mode");
                Self::for_build()
            }),
            Err(_) => Self::for_build(),
        }
    }

    pub const fn rejects_extra_keys(self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::for_build()
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
