//! Interactive capabilities
//!
//! Commands never talk to the terminal directly; they take a [`Prompter`]
//! (field input) or a [`Confirmer`] (yes/no), so the workflows can run under
//! test with scripted answers.

use crate::error::{errors, McpHubResult};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use std::collections::VecDeque;

/// Answers a yes/no question.
pub trait Confirmer {
    fn confirm(&self, message: &str) -> McpHubResult<bool>;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> McpHubResult<bool> {
        Ok(self(message))
    }
}

/// Answers "no" to everything; used when nobody is at the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Confirmer for Decline {
    fn confirm(&self, message: &str) -> McpHubResult<bool> {
        tracing::warn!("No terminal to ask \"{}\"; assuming no", message);
        Ok(false)
    }
}

/// Collects free-form field values.
pub trait Prompter {
    /// Ask for a value. An empty answer yields `default` when one is given.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> McpHubResult<String>;

    /// Ask a yes/no question.
    fn ask_confirm(&mut self, prompt: &str, default: bool) -> McpHubResult<bool>;

    /// Tell the user why an answer was rejected.
    fn reject(&mut self, message: &str) {
        eprintln!("{} {}", "⚠️".yellow(), message);
    }
}

/// dialoguer-backed terminal implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> McpHubResult<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn ask_confirm(&mut self, prompt: &str, default: bool) -> McpHubResult<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

impl Confirmer for TerminalPrompter {
    fn confirm(&self, message: &str) -> McpHubResult<bool> {
        Ok(Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()?)
    }
}

/// Replays a fixed list of answers; an empty answer means "take the default".
///
/// Used for piped input and tests.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub rejections: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            rejections: Vec::new(),
        }
    }

    fn next_answer(&mut self, prompt: &str) -> McpHubResult<String> {
        self.asked.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            errors::validation_error(format!("no answer available for '{}'", prompt), None)
        })
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> McpHubResult<String> {
        let answer = self.next_answer(prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer.to_string())
        }
    }

    fn ask_confirm(&mut self, prompt: &str, default: bool) -> McpHubResult<bool> {
        let answer = self.next_answer(prompt)?;
        Ok(match answer.trim().to_lowercase().as_str() {
            "y" | "yes" | "true" => true,
            "n" | "no" | "false" => false,
            _ => default,
        })
    }

    fn reject(&mut self, message: &str) {
        self.rejections.push(message.to_string());
    }
}
