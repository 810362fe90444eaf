//! Interactive decision prompts
//!
//! The orchestrators never call `inquire` directly; they go through the
//! [`DecisionProvider`] trait so conflict handling and target selection can
//! be driven by tests (or any non-interactive frontend). Cancellation is a
//! normal control value: an Esc'd prompt becomes skip (conflicts) or an
//! empty selection (targets), never an error.

use inquire::{MultiSelect, Select};

use crate::error::Result;
use crate::installer::ConflictStrategy;
use crate::target::Target;

/// Human decision provider consumed by the orchestrators
pub trait DecisionProvider: Sync {
    /// Ask how to handle an existing destination file.
    fn choose_conflict_strategy(&self, path: &str, is_main_doc: bool) -> Result<ConflictStrategy>;

    /// Ask which of the manifest's targets to install. An empty result means
    /// the user cancelled.
    fn choose_targets(&self, available: &[Target]) -> Result<Vec<Target>>;
}

/// `inquire`-backed implementation used by the CLI
pub struct InteractivePrompter;

impl DecisionProvider for InteractivePrompter {
    fn choose_conflict_strategy(&self, path: &str, is_main_doc: bool) -> Result<ConflictStrategy> {
        // Append only makes sense for the main instruction document.
        let options = if is_main_doc {
            vec!["Append", "Overwrite", "Skip"]
        } else {
            vec!["Overwrite", "Skip"]
        };

        let choice = Select::new(&format!("{path} already exists"), options)
            .with_help_message("enter confirm, esc skip this file")
            .prompt_skippable()?;

        Ok(match choice {
            Some("Append") => ConflictStrategy::Append,
            Some("Overwrite") => ConflictStrategy::Overwrite,
            _ => ConflictStrategy::Skip,
        })
    }

    fn choose_targets(&self, available: &[Target]) -> Result<Vec<Target>> {
        if available.len() == 1 {
            return Ok(available.to_vec());
        }

        let items: Vec<&str> = available.iter().map(|t| t.id()).collect();
        let selection = MultiSelect::new("Select targets to install", items)
            .with_help_message("space select, enter confirm, esc cancel")
            .prompt_skippable()?;

        match selection {
            Some(ids) => Ok(available
                .iter()
                .copied()
                .filter(|t| ids.contains(&t.id()))
                .collect()),
            None => Ok(vec![]),
        }
    }
}
