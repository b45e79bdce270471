//! Scripted stand-in for pmgsh used by the integration tests.

use std::cell::RefCell;
use std::collections::HashMap;

use check_pmg::{CommandOutput, CommandRunner, ProbeError};

/// Answers `pmgsh get ...` calls from a table keyed by everything after `get`.
/// Unscripted queries fail the test.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, query: &str, stdout: &str) -> Self {
        self.responses.insert(query.to_string(), stdout.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &[String]) -> Result<CommandOutput, ProbeError> {
        let start = command
            .iter()
            .position(|arg| arg == "get")
            .expect("pmgsh invocation without `get`");
        let query = command[start + 1..].join(" ");
        self.calls.borrow_mut().push(query.clone());

        let stdout = self
            .responses
            .get(&query)
            .unwrap_or_else(|| panic!("unscripted query: {query}"));
        Ok(CommandOutput {
            stdout: stdout.clone(),
            stderr: "200 OK\n".to_string(),
            exit_status: 0,
        })
    }
}
