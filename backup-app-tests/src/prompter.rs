//! Scripted prompter for driving the configuration wizard in tests

use backup_app::managers::wizard::{Prompter, Question, WizardError};
use std::collections::VecDeque;

/// Answers questions from a fixed script and records everything shown
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Questions asked, in order
    pub asked: Vec<Question>,
    /// Lines shown (menus and notices), in order
    pub shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Answers not consumed by the wizard
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn show(&mut self, line: &str) {
        self.shown.push(line.to_string());
    }

    fn ask(&mut self, question: &Question) -> Result<String, WizardError> {
        self.asked.push(question.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| WizardError::Prompt(format!("no scripted answer for '{}'", question.text)))
    }
}
