//! Interactive review loop over a [`WorkflowController`].

use std::{fs, path::Path};

use anyhow::{Context, Result};
use client_core::{
    Action, ActionOutcome, EvaluationForm, FormValues, WorkflowController, WorkflowError,
    WorkflowPage,
};
use shared::domain::parse_score;
use tracing::{debug, info};

use crate::{render::to_terminal, terminal::Terminal};

const ACTION_CHOICES: &str = "What would you like to do? [continue/disagree/new/quit] (continue): ";

enum Flow {
    NewPrompt,
    Exit,
}

pub struct ReviewSession<'a> {
    controller: &'a WorkflowController,
    terminal: &'a Terminal,
    page_out: Option<&'a Path>,
}

impl<'a> ReviewSession<'a> {
    pub fn new(
        controller: &'a WorkflowController,
        terminal: &'a Terminal,
        page_out: Option<&'a Path>,
    ) -> Self {
        Self {
            controller,
            terminal,
            page_out,
        }
    }

    pub async fn run(&self, initial_prompt: Option<String>) -> Result<()> {
        let mut next_prompt = initial_prompt;
        loop {
            let prompt = match next_prompt.take() {
                Some(prompt) => prompt,
                None => match self
                    .terminal
                    .read_line("Enter a content prompt (or 'quit' to exit): ")
                {
                    Some(prompt) => prompt,
                    None => return Ok(()),
                },
            };
            if prompt.trim().eq_ignore_ascii_case("quit") {
                return Ok(());
            }
            if prompt.trim().is_empty() {
                continue;
            }

            let generated = self.controller.generate(&prompt).await;
            self.show_generated().await?;
            if let Err(err) = generated {
                println!("{err}");
                continue;
            }

            match self.review().await? {
                Flow::NewPrompt => continue,
                Flow::Exit => return Ok(()),
            }
        }
    }

    /// Rates the current content and works through the follow-up actions
    /// until the reviewer starts over or leaves.
    async fn review(&self) -> Result<Flow> {
        'rate: loop {
            let page = self.controller.page().await;
            let Some(values) = self.collect_form(page.form()) else {
                return self.leave().await;
            };

            let submitted = self.controller.submit_feedback(&values).await;
            self.show_feedback().await?;
            if let Err(err) = submitted {
                println!("{err}");
                continue;
            }

            loop {
                let Some(choice) = self.terminal.read_line(ACTION_CHOICES) else {
                    return self.leave().await;
                };
                let choice = choice.trim();
                let choice = if choice.is_empty() { "continue" } else { choice };

                if choice.eq_ignore_ascii_case("new") {
                    self.controller.reset().await?;
                    self.publish().await?;
                    return Ok(Flow::NewPrompt);
                }

                let action = match choice.parse::<Action>() {
                    Ok(action) => action,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };

                match self.controller.handle_action(action).await {
                    Ok(ActionOutcome::Regenerated) => {
                        self.show_generated().await?;
                        continue 'rate;
                    }
                    Ok(ActionOutcome::Completed) => {
                        self.publish().await?;
                        return Ok(Flow::NewPrompt);
                    }
                    Ok(ActionOutcome::FeedbackUpdated) => self.show_feedback().await?,
                    Ok(ActionOutcome::Aborted) => debug!("disagree aborted without feedback"),
                    Ok(ActionOutcome::Reset) => {
                        self.publish().await?;
                        return Ok(Flow::Exit);
                    }
                    Err(err) => {
                        if action == Action::Continue
                            && matches!(err, WorkflowError::Request { .. })
                        {
                            self.show_generated().await?;
                        }
                        println!("{err}");
                    }
                }
            }
        }
    }

    async fn leave(&self) -> Result<Flow> {
        self.controller.reset().await?;
        Ok(Flow::Exit)
    }

    fn collect_form(&self, form: Option<&EvaluationForm>) -> Option<FormValues> {
        let mut values = FormValues::new();
        println!("\nPlease rate and provide feedback for the content:");

        for criterion in form.map(EvaluationForm::criteria).unwrap_or_default() {
            let rating = loop {
                let raw = self
                    .terminal
                    .read_line(&format!("Rate {criterion} (0-10) [5]: "))?;
                match parse_score(criterion, &raw) {
                    Ok(_) => break raw,
                    Err(err) => println!("{err}"),
                }
            };
            let feedback = self
                .terminal
                .read_line(&format!("Feedback for {criterion}: "))?;
            values.set_rating(criterion.as_str(), rating);
            values.set_feedback(criterion.as_str(), feedback);
        }

        let evaluator_feedback = self.terminal.read_line("Feedback for the evaluator: ")?;
        values.set_evaluator_feedback(evaluator_feedback);
        Some(values)
    }

    async fn show_generated(&self) -> Result<()> {
        let page = self.publish().await?;
        println!("\n{}", to_terminal(page.content_panel()));
        println!("\n{}", to_terminal(page.evaluation_panel()));
        Ok(())
    }

    async fn show_feedback(&self) -> Result<()> {
        let page = self.publish().await?;
        println!("\n{}", to_terminal(page.feedback_panel()));
        Ok(())
    }

    /// Writes the current page to `page_out`, if configured.
    async fn publish(&self) -> Result<WorkflowPage> {
        let page = self.controller.page().await;
        if let Some(path) = self.page_out {
            fs::write(path, page.to_document())
                .with_context(|| format!("failed to write page to '{}'", path.display()))?;
            info!(path = %path.display(), "page written");
        }
        Ok(page)
    }
}
