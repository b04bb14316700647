//! The interactive session
//!
//! Gate question, then the selection loop, then one execution. Selection
//! errors are reported and the operator is asked again from scratch; input
//! errors end the session.

use crate::command_runner::CommandRunner;
use crate::component::Component;
use crate::config_file::Settings;
use crate::error::Result;
use crate::executor::{ExecutionReport, Executor};
use crate::prompt::{Prompter, is_decline};
use crate::registry::Registry;
use crate::selector;
use tracing::{error, info};

pub const GATE_PROMPT: &str = "Want to install anything? y(Y)/n(N)";
pub const SELECTION_PROMPT: &str = "What would you like to install?";
pub const RETRY_MESSAGE: &str = "Some error occurred, try again.";

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The operator answered no to the gate question
    Declined,
    /// A selection was executed
    Completed(ExecutionReport),
}

/// Answers that let a session run without some of its prompts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presets {
    /// Skip the gate question
    pub assume_yes: bool,
    /// Use this selection instead of asking; a bad one is an error
    pub selection: Option<String>,
}

pub struct Session<'a> {
    registry: &'a Registry,
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    presets: Presets,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a Registry, settings: &'a Settings, runner: &'a dyn CommandRunner) -> Self {
        Self {
            registry,
            settings,
            runner,
            presets: Presets::default(),
        }
    }

    pub fn with_presets(mut self, presets: Presets) -> Self {
        self.presets = presets;
        self
    }

    pub fn run(&self, prompter: &mut dyn Prompter) -> Result<SessionOutcome> {
        if !self.presets.assume_yes {
            let answer = prompter.ask(GATE_PROMPT)?;
            if is_decline(&answer) {
                info!("Nothing to install");
                return Ok(SessionOutcome::Declined);
            }
        }

        let components = self.select(prompter)?;
        let names: Vec<&str> = components.iter().map(|c| c.name()).collect();
        info!("Selected components: {:?}", names);

        let report = Executor::new(self.settings, self.runner).execute(&components, prompter)?;
        Ok(SessionOutcome::Completed(report))
    }

    fn select(&self, prompter: &mut dyn Prompter) -> Result<Vec<&'a dyn Component>> {
        if let Some(selection) = &self.presets.selection {
            return Ok(selector::resolve(self.registry, selection)?);
        }

        loop {
            info!("Available components:");
            for component in self.registry.components() {
                info!("  {}", component.name());
            }

            let input = prompter.ask(SELECTION_PROMPT)?;
            info!("Parsed selection: {:?}", selector::parse_selection(&input));

            match selector::resolve(self.registry, &input) {
                Ok(components) => return Ok(components),
                Err(err) => {
                    error!("{}", err);
                    println!("{}", RETRY_MESSAGE);
                }
            }
        }
    }
}
