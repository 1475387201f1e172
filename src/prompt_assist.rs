//! Background helpers for writing prompts: ideas from a core idea, and a
//! grammar check that runs once the prompt has been left alone for a moment.

use std::time::{Duration, Instant};

use crate::error::GenerationError;
use crate::generation::{TextGenerator, WorkerTask, check_grammar, prompt_variations};

/// Quiet time after the last edit before the prompt is checked
pub const GRAMMAR_DEBOUNCE: Duration = Duration::from_secs(1);

const VARIATIONS_FAILED: &str = "Sorry, there was an error generating ideas.";

/// A grammar check in flight, with the prompt it was started for
struct PendingCheck {
    prompt: String,
    task: WorkerTask<Option<String>>,
}

#[derive(Default)]
pub struct PromptAssist {
    pub core_idea: String,
    variations: Vec<String>,
    variations_message: Option<String>,
    variations_task: Option<WorkerTask<Vec<String>>>,
    /// Prompt text as of the last edit notification
    watched: String,
    edited_at: Option<Instant>,
    /// Prompt that produced an image or was accepted; never re-checked
    settled: Option<String>,
    grammar_task: Option<PendingCheck>,
    suggestion: Option<String>,
}

impl std::fmt::Debug for PromptAssist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptAssist")
            .field("core_idea", &self.core_idea)
            .field("variations", &self.variations.len())
            .field("suggestion", &self.suggestion)
            .finish_non_exhaustive()
    }
}

impl PromptAssist {
    pub fn variations(&self) -> &[String] {
        &self.variations
    }

    /// Placeholder or error shown instead of the list
    pub fn variations_message(&self) -> Option<&str> {
        self.variations_message.as_deref()
    }

    pub fn is_fetching_variations(&self) -> bool {
        self.variations_task.is_some()
    }

    /// Starts fetching ideas for `core_idea`. Refused while a fetch runs or
    /// when there is no idea.
    pub fn request_variations<G: TextGenerator + 'static>(&mut self, generator: G) -> bool {
        if self.variations_task.is_some() {
            return false;
        }
        let idea = self.core_idea.trim().to_string();
        if idea.is_empty() {
            self.variations_message = Some(GenerationError::EmptyIdea.to_string());
            return false;
        }
        self.variations.clear();
        self.variations_message = None;
        self.variations_task = Some(WorkerTask::run(move || prompt_variations(&generator, &idea)));
        true
    }

    /// Shows a failure that happened before any request went out
    pub fn variations_failed(&mut self, message: impl Into<String>) {
        self.variations.clear();
        self.variations_message = Some(message.into());
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Notes the prompt's current text. A change hides any suggestion and
    /// restarts the quiet period.
    pub fn prompt_edited(&mut self, prompt: &str, now: Instant) {
        if prompt == self.watched {
            return;
        }
        self.watched = prompt.to_string();
        self.edited_at = Some(now);
        self.suggestion = None;
    }

    /// When the quiet period is over, hands out the prompt to check, once.
    /// Empty and settled prompts are skipped.
    pub fn take_due_check(&mut self, now: Instant) -> Option<String> {
        let edited_at = self.edited_at?;
        if self.grammar_task.is_some() || now.saturating_duration_since(edited_at) < GRAMMAR_DEBOUNCE {
            return None;
        }
        self.edited_at = None;
        let prompt = self.watched.trim();
        if prompt.is_empty() || self.settled.as_deref() == Some(prompt) {
            return None;
        }
        Some(prompt.to_string())
    }

    /// Time left before [`Self::take_due_check`] will fire
    pub fn check_delay(&self, now: Instant) -> Option<Duration> {
        self.edited_at
            .map(|edited_at| GRAMMAR_DEBOUNCE.saturating_sub(now.saturating_duration_since(edited_at)))
    }

    pub fn start_grammar_check<G: TextGenerator + 'static>(&mut self, generator: G, prompt: String) {
        let checked = prompt.clone();
        self.grammar_task = Some(PendingCheck {
            prompt,
            task: WorkerTask::run(move || check_grammar(&generator, &checked)),
        });
    }

    /// Collects finished work. Returns true while anything is still running.
    pub fn poll(&mut self) -> bool {
        if let Some(task) = &mut self.variations_task {
            if let Some(result) = task.poll() {
                self.variations_task = None;
                match result {
                    Ok(variations) => self.variations = variations,
                    Err(err) => {
                        log::error!("Error generating prompt variations: {err}");
                        self.variations_failed(VARIATIONS_FAILED);
                    }
                }
            }
        }

        if let Some(pending) = &mut self.grammar_task {
            if let Some(result) = pending.task.poll() {
                let checked = std::mem::take(&mut pending.prompt);
                self.grammar_task = None;
                match result {
                    // A reply for text that has since changed is stale
                    Ok(suggestion) if checked == self.watched.trim() => self.suggestion = suggestion,
                    Ok(_) => {}
                    Err(err) => {
                        log::warn!("Grammar check failed: {err}");
                        self.suggestion = None;
                    }
                }
            }
        }

        self.variations_task.is_some() || self.grammar_task.is_some()
    }

    /// Takes the suggestion as the new prompt; it will not be checked again
    pub fn accept_suggestion(&mut self) -> Option<String> {
        let accepted = self.suggestion.take()?;
        self.settle(&accepted);
        Some(accepted)
    }

    pub fn dismiss_suggestion(&mut self) {
        self.suggestion = None;
    }

    /// Marks `prompt` as good, e.g. after it produced an image
    pub fn settle(&mut self, prompt: &str) {
        self.watched = prompt.to_string();
        self.edited_at = None;
        self.settled = Some(prompt.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationResult;

    #[derive(Clone)]
    struct Canned(&'static str);

    impl TextGenerator for Canned {
        fn complete(&self, _instruction: &str) -> GenerationResult<String> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Clone)]
    struct Offline;

    impl TextGenerator for Offline {
        fn complete(&self, _instruction: &str) -> GenerationResult<String> {
            Err(GenerationError::Transport("offline".into()))
        }
    }

    fn settle_tasks(assist: &mut PromptAssist) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while assist.poll() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_check_waits_for_quiet_period() {
        let start = Instant::now();
        let mut assist = PromptAssist::default();
        assist.prompt_edited("a hous", start);
        assert_eq!(assist.take_due_check(start + Duration::from_millis(500)), None);

        // Another keystroke restarts the wait
        assist.prompt_edited("a house", start + Duration::from_millis(900));
        assert_eq!(assist.take_due_check(start + Duration::from_millis(1500)), None);
        assert_eq!(
            assist.check_delay(start + Duration::from_millis(1500)),
            Some(Duration::from_millis(400))
        );

        let due = start + Duration::from_millis(1900);
        assert_eq!(assist.take_due_check(due).as_deref(), Some("a house"));
        assert_eq!(assist.take_due_check(due + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_settled_and_blank_prompts_are_not_checked() {
        let start = Instant::now();
        let later = start + GRAMMAR_DEBOUNCE;
        let mut assist = PromptAssist::default();

        assist.prompt_edited("   ", start);
        assert_eq!(assist.take_due_check(later), None);

        assist.settle("a red barn");
        assist.prompt_edited("a red barn ", start);
        assert_eq!(assist.take_due_check(later), None);
    }

    #[test]
    fn test_suggestion_shown_then_accepted() {
        let start = Instant::now();
        let mut assist = PromptAssist::default();
        assist.prompt_edited("two door garage", start);
        let prompt = assist.take_due_check(start + GRAMMAR_DEBOUNCE).unwrap();
        assist.start_grammar_check(Canned("Two-door garage."), prompt);
        settle_tasks(&mut assist);
        assert_eq!(assist.suggestion(), Some("Two-door garage."));

        assert_eq!(assist.accept_suggestion().as_deref(), Some("Two-door garage."));
        assert_eq!(assist.suggestion(), None);
        assist.prompt_edited("Two-door garage.", start);
        assert_eq!(assist.take_due_check(start + GRAMMAR_DEBOUNCE * 2), None);
    }

    #[test]
    fn test_reply_for_edited_prompt_is_dropped() {
        let start = Instant::now();
        let mut assist = PromptAssist::default();
        assist.prompt_edited("a barn", start);
        let prompt = assist.take_due_check(start + GRAMMAR_DEBOUNCE).unwrap();
        assist.start_grammar_check(Canned("A barn."), prompt);
        assist.prompt_edited("a barn at dusk", start + GRAMMAR_DEBOUNCE);
        settle_tasks(&mut assist);
        assert_eq!(assist.suggestion(), None);
    }

    #[test]
    fn test_variations_fill_the_list() {
        let mut assist = PromptAssist::default();
        assert!(!assist.request_variations(Canned("unused")));
        assert_eq!(assist.variations_message(), Some("Please enter a core idea first."));

        assist.core_idea = "courtyard".into();
        assert!(assist.request_variations(Canned("mossy stone courtyard, glass courtyard at noon")));
        assert!(assist.is_fetching_variations());
        settle_tasks(&mut assist);
        assert_eq!(assist.variations(), ["mossy stone courtyard", "glass courtyard at noon"]);
        assert_eq!(assist.variations_message(), None);
    }

    #[test]
    fn test_failed_variations_show_apology() {
        let mut assist = PromptAssist::default();
        assist.core_idea = "courtyard".into();
        assert!(assist.request_variations(Offline));
        settle_tasks(&mut assist);
        assert!(assist.variations().is_empty());
        assert_eq!(assist.variations_message(), Some(VARIATIONS_FAILED));
    }
}
