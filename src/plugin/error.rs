//! Plugin Error Handling
//!
//! Error types for plugin registration and execution. Registration problems
//! are caller errors and surface before any scan work starts; execution
//! problems are converted into synthetic findings by the scheduler and never
//! abort a scan session.

use std::fmt;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Errors raised while registering a plugin
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// A plugin with this name is already registered
    DuplicateName { plugin_name: String },

    /// Metadata failed validation
    InvalidMetadata { plugin_name: String, reason: String },

    /// Plugin was built against a newer API than this binary provides
    VersionIncompatible {
        plugin_name: String,
        plugin_api: u32,
        system_api: u32,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::DuplicateName { plugin_name } => {
                write!(f, "Plugin already registered: {}", plugin_name)
            }
            RegistrationError::InvalidMetadata {
                plugin_name,
                reason,
            } => {
                write!(f, "Invalid metadata for plugin '{}': {}", plugin_name, reason)
            }
            RegistrationError::VersionIncompatible {
                plugin_name,
                plugin_api,
                system_api,
            } => {
                write!(
                    f,
                    "Plugin '{}' requires API version {} but this build provides {}",
                    plugin_name, plugin_api, system_api
                )
            }
        }
    }
}

impl std::error::Error for RegistrationError {}

impl crate::core::error_handling::ContextualError for RegistrationError {
    fn is_user_actionable(&self) -> bool {
        // Registration failures come from plugin authors or exclusion flags,
        // not from the query the user typed.
        false
    }

    fn user_message(&self) -> Option<String> {
        None
    }
}

/// Errors a plugin can report from its scan operation
#[derive(Debug, Clone, PartialEq)]
pub enum PluginError {
    /// A required API key was absent at scan time
    MissingApiKey {
        plugin_name: String,
        key_name: String,
    },

    /// An upstream service could not be reached or answered abnormally
    ServiceError { plugin_name: String, cause: String },

    /// Plugin-internal failure during an operation
    ExecutionError {
        plugin_name: String,
        operation: String,
        cause: String,
    },

    /// Generic plugin error
    Generic { message: String },
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginError::MissingApiKey {
                plugin_name,
                key_name,
            } => {
                write!(f, "Plugin '{}' is missing API key '{}'", plugin_name, key_name)
            }
            PluginError::ServiceError { plugin_name, cause } => {
                write!(f, "Plugin '{}' service error: {}", plugin_name, cause)
            }
            PluginError::ExecutionError {
                plugin_name,
                operation,
                cause,
            } => {
                write!(
                    f,
                    "Plugin '{}' failed during '{}': {}",
                    plugin_name, operation, cause
                )
            }
            PluginError::Generic { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for PluginError {}

impl PluginError {
    /// Wrap a transport error from the shared HTTP client
    pub fn from_http(plugin_name: &str, err: reqwest::Error) -> Self {
        PluginError::ServiceError {
            plugin_name: plugin_name.to_string(),
            cause: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_display() {
        let err = RegistrationError::DuplicateName {
            plugin_name: "mail_profile".to_string(),
        };
        assert_eq!(err.to_string(), "Plugin already registered: mail_profile");

        let err = RegistrationError::VersionIncompatible {
            plugin_name: "newer".to_string(),
            plugin_api: 20990101,
            system_api: 20250812,
        };
        assert!(err.to_string().contains("20990101"));
        assert!(err.to_string().contains("20250812"));
    }

    #[test]
    fn test_plugin_error_display() {
        let err = PluginError::MissingApiKey {
            plugin_name: "breach_watch".to_string(),
            key_name: "breach_watch_api".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Plugin 'breach_watch' is missing API key 'breach_watch_api'"
        );

        let err = PluginError::ExecutionError {
            plugin_name: "ip_classify".to_string(),
            operation: "scan".to_string(),
            cause: "address family unsupported".to_string(),
        };
        assert!(err.to_string().contains("ip_classify"));
        assert!(err.to_string().contains("scan"));
    }
}
