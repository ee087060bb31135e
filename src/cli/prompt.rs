//! Terminal prompts built on `inquire`.

use inquire::error::InquireError;
use inquire::{MultiSelect, Password, PasswordDisplayMode};
use log::warn;
use secrecy::SecretString;

use crate::error::SecretError;
use crate::orchestrator::{PasswordEntry, SecretPrompt};

/// Password prompts on the controlling terminal. Esc or Ctrl-C cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

fn ask_password(message: &str) -> Option<String> {
    let answer = Password::new(message)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt();
    cancellable(answer)
}

/// Maps an `inquire` answer to `None` when the prompt was dismissed or
/// could not be shown.
fn cancellable<T>(answer: Result<T, InquireError>) -> Option<T> {
    match answer {
        Ok(value) => Some(value),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => None,
        Err(err) => {
            warn!("prompt failed: {err}");
            None
        }
    }
}

impl SecretPrompt for TerminalPrompt {
    fn ca_password(&mut self) -> Option<SecretString> {
        ask_password("CA certificate password:").map(SecretString::from)
    }

    fn new_certificate_password(&mut self) -> Option<PasswordEntry> {
        let password = ask_password("New certificate password:")?;
        let confirmation = ask_password("Confirm password:")?;
        Some(PasswordEntry::new(password, confirmation))
    }

    fn reject(&mut self, error: SecretError) {
        eprintln!("{error}");
    }
}

/// Lets the user pick roles from `offered`. Returns them in list order, or
/// `None` when the prompt was dismissed.
pub fn pick_roles(id_type: &str, offered: &[String]) -> Option<Vec<String>> {
    let answer = MultiSelect::new(&format!("{id_type} roles:"), offered.to_vec()).prompt();
    cancellable(answer)
}
