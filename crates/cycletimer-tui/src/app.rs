//! Application state management

use anyhow::Result;
use cycletimer_core::format::window_title;
use cycletimer_core::models::{Config, Cycle, NewCycle, MAX_MINUTES, MIN_MINUTES};
use cycletimer_core::Error;
use cycletimer_engine::{CycleManager, CycleSnapshot};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Task,
    Minutes,
}

/// The "new cycle" form. Disabled while a cycle is running.
#[derive(Debug, Clone)]
pub struct CycleForm {
    pub task: String,
    pub minutes: String,
    pub focused: FormField,
    pub error: Option<String>,
    suggestion_index: Option<usize>,
}

impl CycleForm {
    pub fn new(default_minutes: u32) -> Self {
        Self {
            task: String::new(),
            minutes: default_minutes.to_string(),
            focused: FormField::Task,
            error: None,
            suggestion_index: None,
        }
    }

    pub fn reset(&mut self, default_minutes: u32) {
        *self = Self::new(default_minutes);
    }

    pub fn toggle_field(&mut self) {
        self.focused = match self.focused {
            FormField::Task => FormField::Minutes,
            FormField::Minutes => FormField::Task,
        };
    }

    pub fn push_char(&mut self, c: char) {
        match self.focused {
            FormField::Task => {
                self.task.push(c);
                self.suggestion_index = None;
            }
            FormField::Minutes if c.is_ascii_digit() && self.minutes.len() < 2 => {
                self.minutes.push(c);
            }
            FormField::Minutes => {}
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        match self.focused {
            FormField::Task => {
                self.task.pop();
                self.suggestion_index = None;
            }
            FormField::Minutes => {
                self.minutes.pop();
            }
        }
        self.error = None;
    }

    /// Cycle through configured task names.
    pub fn next_suggestion(&mut self, suggestions: &[String], forward: bool) {
        if suggestions.is_empty() {
            return;
        }

        let len = suggestions.len();
        let next = match (self.suggestion_index, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };

        self.suggestion_index = Some(next);
        self.task = suggestions[next].clone();
        self.error = None;
    }

    /// Move the duration by `step` minutes, clamped to the allowed range.
    pub fn step_minutes(&mut self, step: u32, up: bool) {
        let current: u32 = self.minutes.trim().parse().unwrap_or(0);
        let next = if up {
            current.saturating_add(step)
        } else {
            current.saturating_sub(step)
        };
        self.minutes = next.clamp(MIN_MINUTES, MAX_MINUTES).to_string();
        self.error = None;
    }

    pub fn parse(&self) -> cycletimer_core::Result<NewCycle> {
        NewCycle::parse(&self.task, &self.minutes)
    }

    /// The start button is disabled until a task is typed.
    pub fn can_submit(&self) -> bool {
        !self.task.trim().is_empty()
    }
}

pub struct App {
    pub manager: Arc<CycleManager>,
    pub config: Config,
    pub form: CycleForm,
    pub snapshot: CycleSnapshot,
    /// All cycles, newest first
    pub history: Vec<Cycle>,
    pub selected_history_index: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(manager: Arc<CycleManager>, config: Config) -> Self {
        let form = CycleForm::new(config.timer.default_minutes);
        Self {
            manager,
            config,
            form,
            snapshot: CycleSnapshot {
                active_cycle: None,
                elapsed_seconds: 0,
            },
            history: Vec::new(),
            selected_history_index: 0,
            show_help: false,
            should_quit: false,
            status_message: String::new(),
        }
    }

    pub async fn refresh(&mut self) {
        self.snapshot = self.manager.snapshot().await;

        let mut history = self.manager.cycles().await;
        history.reverse();

        // New cycles land at the top; keep the highlight on the same cycle.
        if !self.history.is_empty() {
            let added = history.len().saturating_sub(self.history.len());
            self.selected_history_index += added;
        }
        self.history = history;

        if self.selected_history_index >= self.history.len() {
            self.selected_history_index = self.history.len().saturating_sub(1);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.snapshot.is_idle()
    }

    /// Validate the form and start a cycle from it.
    pub async fn submit(&mut self) -> Result<()> {
        if self.is_active() {
            self.status_message = "A cycle is already running".to_string();
            return Ok(());
        }

        let new_cycle = match self.form.parse() {
            Ok(new_cycle) => new_cycle,
            Err(Error::Validation(message)) => {
                self.form.error = Some(message);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let task = new_cycle.task.clone();
        let minutes = new_cycle.minutes_amount;
        self.manager.start_cycle(new_cycle).await?;

        self.form.reset(self.config.timer.default_minutes);
        self.status_message = format!("Started '{}' for {} min", task, minutes);
        self.refresh().await;
        Ok(())
    }

    pub async fn interrupt(&mut self) {
        match self.manager.interrupt_cycle().await {
            Some(cycle) => self.status_message = format!("Interrupted '{}'", cycle.task),
            None => self.status_message = "No cycle is running".to_string(),
        }
        self.refresh().await;
    }

    pub fn next_suggestion(&mut self, forward: bool) {
        let suggestions = self.config.ui.task_suggestions.clone();
        self.form.next_suggestion(&suggestions, forward);
    }

    pub fn step_minutes(&mut self, up: bool) {
        self.form.step_minutes(self.config.timer.minutes_step, up);
    }

    pub fn select_next_history(&mut self) {
        if self.selected_history_index + 1 < self.history.len() {
            self.selected_history_index += 1;
        }
    }

    pub fn select_previous_history(&mut self) {
        self.selected_history_index = self.selected_history_index.saturating_sub(1);
    }

    pub fn window_title(&self) -> String {
        window_title(self.snapshot.remaining_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycletimer_core::ManualClock;
    use tokio::time::Duration;

    fn test_app() -> App {
        let clock = Arc::new(ManualClock::starting_now());
        let manager = Arc::new(CycleManager::with_clock(clock, Duration::from_secs(1)));
        App::new(manager, Config::default())
    }

    #[test]
    fn test_form_minutes_accepts_digits_only() {
        let mut form = CycleForm::new(25);
        form.toggle_field();
        form.backspace();
        form.backspace();
        for c in ['4', 'x', '5', '9'] {
            form.push_char(c);
        }
        assert_eq!(form.minutes, "45");
    }

    #[test]
    fn test_form_step_minutes_clamps() {
        let mut form = CycleForm::new(25);
        form.step_minutes(5, true);
        assert_eq!(form.minutes, "30");

        form.minutes = "58".to_string();
        form.step_minutes(5, true);
        assert_eq!(form.minutes, "60");

        form.minutes = "3".to_string();
        form.step_minutes(5, false);
        assert_eq!(form.minutes, "1");
    }

    #[test]
    fn test_form_suggestions_wrap() {
        let suggestions = vec!["a".to_string(), "b".to_string()];
        let mut form = CycleForm::new(25);

        form.next_suggestion(&suggestions, true);
        assert_eq!(form.task, "a");
        form.next_suggestion(&suggestions, true);
        assert_eq!(form.task, "b");
        form.next_suggestion(&suggestions, true);
        assert_eq!(form.task, "a");
        form.next_suggestion(&suggestions, false);
        assert_eq!(form.task, "b");
    }

    #[test]
    fn test_can_submit_requires_task() {
        let mut form = CycleForm::new(25);
        assert!(!form.can_submit());
        form.push_char('x');
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn test_submit_invalid_shows_error() {
        let mut app = test_app();
        app.form.task = "Write report".to_string();
        app.form.minutes = "0".to_string();

        app.submit().await.unwrap();
        assert!(app.form.error.is_some());
        assert!(!app.is_active());
        assert!(app.history.is_empty());
    }

    #[tokio::test]
    async fn test_submit_starts_cycle_and_resets_form() {
        let mut app = test_app();
        app.form.task = "Write report".to_string();
        app.form.minutes = "1".to_string();

        app.submit().await.unwrap();
        assert!(app.is_active());
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.form.task, "");
        assert_eq!(app.form.minutes, "25");
        assert_eq!(app.window_title(), "01:00 - cycletimer");

        // The form is locked while a cycle runs
        app.form.task = "Other".to_string();
        app.submit().await.unwrap();
        assert_eq!(app.history.len(), 1);

        app.interrupt().await;
        assert!(!app.is_active());
        assert!(app.history[0].is_interrupted());
        assert_eq!(app.window_title(), "cycletimer");

        app.manager.shutdown().await;
    }

    #[tokio::test]
    async fn test_history_selection_follows_cycle() {
        let mut app = test_app();

        for task in ["first", "second"] {
            app.form.task = task.to_string();
            app.submit().await.unwrap();
            app.interrupt().await;
        }
        assert_eq!(app.history[0].task, "second");
        assert_eq!(app.selected_history_index, 1);
        assert_eq!(app.history[app.selected_history_index].task, "first");

        app.form.task = "third".to_string();
        app.submit().await.unwrap();
        assert_eq!(app.history.len(), 3);
        assert_eq!(app.selected_history_index, 2);
        assert_eq!(app.history[app.selected_history_index].task, "first");

        app.manager.shutdown().await;
    }
}
