use eyre::{bail, Result as EyreResult};
use inquire::{Confirm, InquireError, Select, Text};

use crate::errors::UserTermination;

/// Interactive questions asked while resolving missing values.
pub trait Prompter: Send + Sync {
    /// Asks the user to pick one of `options`; returns its index.
    fn select(&self, message: &str, options: &[String]) -> EyreResult<usize>;

    fn confirm(&self, message: &str, default: bool) -> EyreResult<bool>;

    fn text(&self, message: &str, default: Option<&str>) -> EyreResult<String>;
}

/// Terminal prompts backed by `inquire`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InquirePrompter;

fn interrupted(err: InquireError) -> eyre::Report {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            UserTermination.into()
        }
        err => err.into(),
    }
}

impl Prompter for InquirePrompter {
    fn select(&self, message: &str, options: &[String]) -> EyreResult<usize> {
        if options.is_empty() {
            bail!("Nothing to choose from for: {message}");
        }

        let choice = Select::new(message, options.to_vec())
            .with_page_size(10)
            .raw_prompt()
            .map_err(interrupted)?;

        Ok(choice.index)
    }

    fn confirm(&self, message: &str, default: bool) -> EyreResult<bool> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(interrupted)
    }

    fn text(&self, message: &str, default: Option<&str>) -> EyreResult<String> {
        let mut prompt = Text::new(message);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        prompt.prompt().map_err(interrupted)
    }
}
