//! Foreground state, updated only from reporter events.

use crate::progress::{Event, Outcome};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// What the front end shows as its heading.
    pub title: String,
    pub percentage: u8,
    pub log: Vec<String>,
    pub outcome: Option<Outcome>,
}

impl UiState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            percentage: 0,
            log: Vec::new(),
            outcome: None,
        }
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Progress(p) => self.percentage = *p,
            Event::Log(line) => self.log.push(line.clone()),
            Event::Finished(outcome) => {
                self.title = "Finished".to_string();
                if outcome.is_success() {
                    self.percentage = 100;
                }
                self.outcome = Some(outcome.clone());
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The one-line result shown once the job is over.
    pub fn result_label(&self) -> Option<String> {
        self.outcome.as_ref().map(|outcome| match outcome {
            Outcome::Completed(path) => format!("Saved to {}", path.display()),
            Outcome::Failed(reason) => format!("Download failed: {}", reason),
        })
    }
}

/// Applies events to `state` until the job finishes or every reporter is
/// dropped. `render` is called after each applied event.
pub async fn run_event_loop<R>(
    receiver: &mut UnboundedReceiver<Event>,
    state: &mut UiState,
    mut render: R,
) -> Option<Outcome>
where
    R: FnMut(&UiState, &Event),
{
    while let Some(event) = receiver.recv().await {
        state.apply(&event);
        render(state, &event);
        if state.is_finished() {
            break;
        }
    }
    state.outcome.clone()
}
