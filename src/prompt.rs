//! Interactive confirmation and input.
//!
//! The [`Manager`][crate::manager::Manager] never reads stdin itself; it asks through a
//! [`Prompt`] so that orchestration can run unattended or under test.

use crate::error::Error;
use dialoguer::{Confirm, Input};
use is_terminal::IsTerminal;

pub trait Prompt: Send + Sync {
    /// Ask a yes/no question. `Ok(false)` means the user declined.
    fn confirm(&self, question: &str) -> Result<bool, Error>;

    /// Ask for a line of text.
    fn input(&self, question: &str) -> Result<String, Error>;
}

/// [`Prompt`] reading from the controlling terminal with `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    /// With `assume_yes`, every confirmation is answered yes without reading the terminal.
    #[must_use]
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn require_terminal(question: &str) -> Result<(), Error> {
        if std::io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(Error::NotInteractive(question.to_string()))
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool, Error> {
        if self.assume_yes {
            tracing::debug!("assuming yes for \"{question}\"");
            return Ok(true);
        }
        Self::require_terminal(question)?;
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(|err| {
                tracing::debug!("prompt aborted: {err}");
                Error::Cancelled
            })
    }

    fn input(&self, question: &str) -> Result<String, Error> {
        Self::require_terminal(question)?;
        Input::<String>::new()
            .with_prompt(question)
            .interact_text()
            .map_err(|err| {
                tracing::debug!("prompt aborted: {err}");
                Error::Cancelled
            })
    }
}
