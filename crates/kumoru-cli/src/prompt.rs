//! Interactive input.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::CliError;

/// Source of interactive answers.
pub trait Prompt {
    /// Shows `message` and reads one visible line.
    ///
    /// # Errors
    ///
    /// Fails when the terminal cannot be read.
    fn read_line(&mut self, message: &str) -> Result<String, CliError>;

    /// Shows `message` and reads a line without echoing it.
    ///
    /// # Errors
    ///
    /// Fails when the terminal cannot be read.
    fn read_password(&mut self, message: &str) -> Result<String, CliError>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, message: &str) -> Result<String, CliError> {
        let prompt_err = |source| CliError::Prompt { what: "input", source };

        let mut stderr = io::stderr().lock();
        write!(stderr, "{message}").map_err(prompt_err)?;
        stderr.flush().map_err(prompt_err)?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map_err(prompt_err)?;
        Ok(line.trim().to_string())
    }

    fn read_password(&mut self, message: &str) -> Result<String, CliError> {
        rpassword::prompt_password(message).map_err(|source| CliError::Prompt {
            what: "password",
            source,
        })
    }
}

/// Answers prompts from a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
}

impl ScriptedPrompt {
    /// Answers each prompt with the next value, in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    fn next(&mut self, what: &'static str) -> Result<String, CliError> {
        self.answers.pop_front().ok_or_else(|| CliError::Prompt {
            what,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left"),
        })
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _message: &str) -> Result<String, CliError> {
        self.next("input")
    }

    fn read_password(&mut self, _message: &str) -> Result<String, CliError> {
        self.next("password")
    }
}

/// Asks for a password twice and requires both to match.
///
/// # Errors
///
/// Fails when reading fails or the entries differ.
pub fn confirm_password<P: Prompt + ?Sized>(prompt: &mut P) -> Result<String, CliError> {
    let password = prompt.read_password("Enter password: ")?;
    let confirmation = prompt.read_password("Confirm password: ")?;
    if password != confirmation {
        return Err(CliError::InvalidArgument("passwords do not match".into()));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_answers_in_order() {
        let mut prompt = ScriptedPrompt::new(["ada@example.com", "secret"]);
        assert_eq!(prompt.read_line("Username: ").expect("line"), "ada@example.com");
        assert_eq!(prompt.read_password("Password: ").expect("password"), "secret");
        assert!(matches!(
            prompt.read_line("again: "),
            Err(CliError::Prompt { what: "input", .. })
        ));
    }

    #[test]
    fn confirmed_password() {
        let mut prompt = ScriptedPrompt::new(["pw", "pw"]);
        assert_eq!(confirm_password(&mut prompt).expect("match"), "pw");
    }

    #[test]
    fn mismatched_password() {
        let mut prompt = ScriptedPrompt::new(["pw", "other"]);
        let err = confirm_password(&mut prompt).expect_err("mismatch");
        assert!(err.to_string().contains("do not match"));
    }
}
