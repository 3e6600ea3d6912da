//! Console prompt: blocking stdin/stdout interaction.

use std::io::{self, BufRead, Write};

use super::UserPrompt;
use crate::error::SourceError;

/// Interactive prompt over standard input/output.
///
/// Invalid answers are rejected with a short notice and the question is
/// asked again; only a closed input stream surfaces as an error.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    /// Creates a console prompt.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String, SourceError> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| SourceError::PromptClosed {
                message: e.to_string(),
            })?;
        if read == 0 {
            return Err(SourceError::PromptClosed {
                message: "end of input".to_string(),
            });
        }
        Ok(line.trim().to_string())
    }

    fn print_question(&self, question: &str) {
        print!("{question} ");
        let _ = io::stdout().flush();
    }
}

impl UserPrompt for ConsolePrompt {
    fn ask(&mut self, question: &str, options: &[&str]) -> Result<String, SourceError> {
        loop {
            self.print_question(&format!("{question} ({})", options.join("/")));
            let answer = self.read_line()?;
            let lowered = answer.to_ascii_lowercase();
            if options.iter().any(|opt| opt.eq_ignore_ascii_case(&lowered)) {
                return Ok(lowered);
            }
            println!("That is not one of the options, try again.");
        }
    }

    fn ask_text(&mut self, question: &str) -> Result<String, SourceError> {
        loop {
            self.print_question(question);
            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("Please enter a value.");
        }
    }

    fn ask_number(&mut self, question: &str) -> Result<f64, SourceError> {
        loop {
            self.print_question(question);
            let answer = self.read_line()?;
            match answer.parse::<f64>() {
                Ok(value) => return Ok(value),
                Err(_) => println!("That is not a number, try again."),
            }
        }
    }

    fn inform(&mut self, message: &str) {
        println!("{message}");
    }
}
