//! Shared fakes for integration tests

#![allow(dead_code)]

use servboot::{
    Component, CommandRunner, CommandStatus, NoRun, PhaseContext, Result, RunPhase,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every command; commands starting with one of `failing` exit 1
#[derive(Default)]
pub struct ScriptedRunner {
    pub commands: RefCell<Vec<String>>,
    pub failing: Vec<&'static str>,
}

impl ScriptedRunner {
    pub fn failing_on(prefixes: &[&'static str]) -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            failing: prefixes.to_vec(),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn execute(&self, command: &str) -> Result<CommandStatus> {
        self.commands.borrow_mut().push(command.to_string());
        if self.failing.iter().any(|prefix| command.starts_with(prefix)) {
            Ok(CommandStatus::from_code(1))
        } else {
            Ok(CommandStatus::SUCCESS)
        }
    }
}

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Component that runs `<phase> <name>` through the command runner and
/// notes the phase in a shared log
pub struct FakeComponent {
    pub name: &'static str,
    pub packages: &'static [&'static str],
    pub log: EventLog,
}

impl FakeComponent {
    pub fn boxed(
        name: &'static str,
        packages: &'static [&'static str],
        log: &EventLog,
    ) -> Box<dyn Component> {
        Box::new(Self {
            name,
            packages,
            log: Rc::clone(log),
        })
    }
}

impl Component for FakeComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "fake component"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        self.packages
    }

    fn install(&self, ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        self.log.borrow_mut().push(format!("install:{}", self.name));
        ctx.execute(&format!("install {}", self.name))?;
        Ok(Box::new(FakeRun {
            name: self.name,
            log: Rc::clone(&self.log),
        }))
    }
}

struct FakeRun {
    name: &'static str,
    log: EventLog,
}

impl RunPhase for FakeRun {
    fn run(&self, ctx: &mut PhaseContext<'_>) -> Result<()> {
        self.log.borrow_mut().push(format!("run:{}", self.name));
        ctx.execute(&format!("run {}", self.name))
    }
}

/// Component with no packages and nothing to do
pub struct Bare(pub &'static str);

impl Component for Bare {
    fn name(&self) -> &'static str {
        self.0
    }

    fn description(&self) -> &'static str {
        "bare component"
    }

    fn package_dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn install(&self, _ctx: &mut PhaseContext<'_>) -> Result<Box<dyn RunPhase>> {
        Ok(Box::new(NoRun))
    }
}
