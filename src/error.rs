//! Error handling module for servboot
//!
//! Provides centralized error types using thiserror. Selection errors are
//! kept in their own enum because they are recoverable: the session loop
//! reports them and asks again instead of aborting.

use thiserror::Error;

/// Recoverable errors raised while resolving an operator's selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No registry entry contains the token
    #[error("Don't know what to do with {0:?}")]
    UnknownComponent(String),

    /// More than one registry entry contains the token
    #[error("Conflicting components found for {token:?}, which of {candidates:?} do you want to install?")]
    AmbiguousComponent {
        token: String,
        candidates: Vec<String>,
    },
}

/// Main error type for servboot
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// IO errors (file writes, asset copies, spawning commands)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not running with root privileges
    #[error("This program must be run as root")]
    Privilege,

    /// Selection could not be resolved
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A shell command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {}", code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string()))]
    CommandFailed { command: String, code: Option<i32> },

    /// Interactive input could not be read (EOF, closed terminal)
    #[error("Input error: {0}")]
    Input(String),

    /// Configuration errors (settings file, missing asset directory)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Component phase errors that are not command failures
    #[error("Component {component} failed: {message}")]
    Component {
        component: &'static str,
        message: String,
    },
}

/// Result type alias for servboot operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

impl BootstrapError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a component error
    pub fn component(component: &'static str, msg: impl Into<String>) -> Self {
        Self::Component {
            component,
            message: msg.into(),
        }
    }

    /// Create a command failure from a command line and its exit code
    pub fn command_failed(command: impl Into<String>, code: Option<i32>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
        }
    }

    /// Whether this error ends the session regardless of failure policy
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Privilege | Self::Input(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BootstrapError::config("no asset directory given");
        assert_eq!(err.to_string(), "Configuration error: no asset directory given");

        let err = BootstrapError::command_failed("systemctl reload nginx", Some(1));
        assert_eq!(
            err.to_string(),
            "Command `systemctl reload nginx` failed with exit code 1"
        );
    }

    #[test]
    fn test_command_failed_without_code() {
        let err = BootstrapError::command_failed("sleep 100", None);
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_selection_error_conversion() {
        let err: BootstrapError = SelectionError::UnknownComponent("on".to_string()).into();
        assert!(matches!(
            err,
            BootstrapError::Selection(SelectionError::UnknownComponent(_))
        ));
        assert_eq!(err.to_string(), "Don't know what to do with \"on\"");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BootstrapError = io_err.into();
        assert!(matches!(err, BootstrapError::Io(_)));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(BootstrapError::Privilege.is_fatal());
        assert!(BootstrapError::input("stdin closed").is_fatal());
        assert!(!BootstrapError::command_failed("false", Some(1)).is_fatal());
    }
}
