//! servboot library
//!
//! Component registry, selection, dependency aggregation and execution for
//! the personal-server bootstrap installer.

pub mod cli;
pub mod command_runner;
pub mod component;
pub mod components;
pub mod config_file;
pub mod error;
pub mod executor;
pub mod logic;
pub mod process_guard;
pub mod prompt;
pub mod registry;
pub mod sanity;
pub mod selector;
pub mod session;
pub mod template;
pub mod types;

// Re-export main types for convenience
pub use command_runner::{CommandRunner, CommandStatus, ShellCommandRunner};
pub use component::{Component, NoRun, PhaseContext, RunPhase};
pub use config_file::Settings;
pub use error::{BootstrapError, Result, SelectionError};
pub use executor::{ExecutionReport, Executor, Failure, Phase};
pub use logic::resolver::{aggregate_packages, undeclared_dependencies};
pub use prompt::{LinePrompter, Prompter, TerminalPrompter};
pub use registry::Registry;
pub use selector::resolve;
pub use session::{Presets, Session, SessionOutcome};
pub use types::FailurePolicy;
