//! Operator confirmation.

use anyhow::Result;
use dialoguer::Input;

#[cfg(test)]
use mockall::automock;

/// Asks the operator a question and returns the raw answer.
#[cfg_attr(test, automock)]
pub trait Confirmer {
    fn ask(&self, prompt: &str) -> Result<String>;
}

/// Reads a single line from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn ask(&self, prompt: &str) -> Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}

/// Only the exact token confirms. `y`, `yes` or `Y ` are all a decline
/// when the token is `Y`.
pub fn is_affirmative(answer: &str, token: &str) -> bool {
    answer == token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_token_confirms() {
        assert!(is_affirmative("Y", "Y"));
        assert!(is_affirmative("yes", "yes"));
    }

    #[test]
    fn test_anything_else_declines() {
        for answer in ["y", "yes", "YES", "Y ", " Y", "", "n", "N"] {
            assert!(!is_affirmative(answer, "Y"), "{:?} should decline", answer);
        }
    }
}
