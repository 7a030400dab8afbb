//! Console prompts that re-ask until the answer is valid.
//!
//! Generic over the input and output streams so the loop can be driven from
//! a byte buffer in tests. End of input counts as an interruption.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use charsmith_core::catalog::CatalogEntry;
use charsmith_core::validate;

/// Why a prompt could not produce an answer.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user closed the input (Ctrl-D) instead of answering.
    #[error("Character creation cancelled.")]
    Interrupted,

    /// Reading or writing the console failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Interactive question-and-answer over a reader and a writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompter reading answers from `input` and writing questions to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// The output stream, for printing between questions.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the prompter, returning the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(PromptError::Interrupted);
        }
        Ok(line.trim().to_string())
    }

    /// Ask for a catalogue entry until one is recognized.
    ///
    /// # Errors
    /// Returns [`PromptError`] on end of input or console failure.
    pub fn choose<T: CatalogEntry>(&mut self, label: &str) -> Result<T, PromptError> {
        self.choose_inner(label, None)
    }

    /// Like [`Prompter::choose`], but an empty answer picks `default`.
    ///
    /// # Errors
    /// Returns [`PromptError`] on end of input or console failure.
    pub fn choose_or<T: CatalogEntry>(
        &mut self,
        label: &str,
        default: T,
    ) -> Result<T, PromptError> {
        self.choose_inner(label, Some(default))
    }

    fn choose_inner<T: CatalogEntry>(
        &mut self,
        label: &str,
        default: Option<T>,
    ) -> Result<T, PromptError> {
        let options = T::names().join(", ");
        let question = match default {
            Some(d) => format!("Choose {label} ({options}) [{}]: ", d.as_str()),
            None => format!("Choose {label} ({options}): "),
        };
        loop {
            let answer = self.ask(&question)?;
            if answer.is_empty() {
                if let Some(d) = default {
                    return Ok(d);
                }
            }
            match validate::require::<T>(&answer) {
                Ok(entry) => return Ok(entry),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }

    /// Ask a yes/no question until answered.
    ///
    /// # Errors
    /// Returns [`PromptError`] on end of input or console failure.
    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        loop {
            let answer = self.ask(&format!("{question} "))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }

    /// Ask for free text; an empty answer is `None`.
    ///
    /// # Errors
    /// Returns [`PromptError`] on end of input or console failure.
    pub fn optional(&mut self, question: &str) -> Result<Option<String>, PromptError> {
        let answer = self.ask(question)?;
        Ok((!answer.is_empty()).then_some(answer))
    }
}
