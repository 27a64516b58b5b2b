//! Interactive prompts using dialoguer

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};

use super::lookup::{Field, Prompter};
use crate::pipeline::SegmentError;
use crate::utils::print_warning;

/// Prompter backed by the terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm_new_entry(&mut self) -> Result<bool> {
        confirm_step("Will there be a new entry?")
    }

    fn ask(&mut self, field: Field, hint: &str) -> Result<String> {
        println!("    {}", style(hint).dim());
        let answer: String = Input::new()
            .with_prompt(field.prompt())
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }

    fn reject(&mut self, error: &SegmentError) {
        print_warning(&format!(
            "Wrong entry. Keep your inputs inside pre-selected items. ({})",
            error
        ));
    }
}

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}
