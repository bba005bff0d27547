//! The sink pipelines push progress and status lines into.
//!
//! A [`Reporter`] is cheap to clone and safe to use from the worker thread; the
//! foreground owns the matching receiver and decides how to render events.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The terminal result of a job, as it crosses back to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(PathBuf),
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

/// Events flowing from a pipeline to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Percentage of the current job, 0 to 100, never decreasing within a job.
    Progress(u8),
    /// A human readable status or error line.
    Log(String),
    /// The job (or playlist run) is over.
    Finished(Outcome),
}

#[derive(Debug, Clone)]
pub struct Reporter {
    sender: UnboundedSender<Event>,
    high_water: Arc<AtomicU8>,
}

impl Reporter {
    /// Creates a reporter and the receiver the foreground listens on.
    pub fn channel() -> (Self, UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let reporter = Self {
            sender,
            high_water: Arc::new(AtomicU8::new(0)),
        };
        (reporter, receiver)
    }

    /// Starts a new job: the percentage scale goes back to zero.
    pub fn begin_job(&self) {
        self.high_water.store(0, Ordering::SeqCst);
        self.send(Event::Progress(0));
    }

    /// Reports `percentage`, clamped to 100.
    ///
    /// Values below what was already reported for the current job are dropped.
    pub fn progress(&self, percentage: u8) {
        let percentage = percentage.min(100);
        let previous = self.high_water.fetch_max(percentage, Ordering::SeqCst);
        if percentage > previous {
            self.send(Event::Progress(percentage));
        }
    }

    /// The last percentage reported for the current job.
    pub fn current(&self) -> u8 {
        self.high_water.load(Ordering::SeqCst)
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.send(Event::Log(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.send(Event::Log(message));
    }

    pub fn finish(&self, outcome: Outcome) {
        self.send(Event::Finished(outcome));
    }

    fn send(&self, event: Event) {
        // The foreground may already be gone; the job still runs to completion.
        if self.sender.send(event).is_err() {
            log::trace!("progress receiver dropped");
        }
    }
}

/// Maps byte progress of one download onto a slice of the job's percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u8,
    pub end: u8,
}

impl Span {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// The percentage for `downloaded` out of `total` bytes. Unknown totals
    /// (zero) stay at the start of the span.
    pub fn at(&self, downloaded: u64, total: u64) -> u8 {
        if total == 0 || self.end <= self.start {
            return self.start;
        }
        let width = u64::from(self.end - self.start);
        let offset = downloaded.min(total) * width / total;
        self.start + offset as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(receiver: &mut UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn progress_never_goes_backwards() {
        let (reporter, mut receiver) = Reporter::channel();
        reporter.begin_job();
        for value in [30, 60, 50, 80, 30, 60, 90, 250] {
            reporter.progress(value);
        }

        let values: Vec<u8> = drain(&mut receiver)
            .into_iter()
            .filter_map(|event| match event {
                Event::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(values, vec![0, 30, 60, 80, 90, 100]);
    }

    #[test]
    fn begin_job_resets_the_scale() {
        let (reporter, mut receiver) = Reporter::channel();
        reporter.begin_job();
        reporter.progress(100);
        reporter.begin_job();
        reporter.progress(30);
        assert_eq!(reporter.current(), 30);
        assert_eq!(
            drain(&mut receiver),
            vec![
                Event::Progress(0),
                Event::Progress(100),
                Event::Progress(0),
                Event::Progress(30)
            ]
        );
    }

    #[test]
    fn sending_after_receiver_dropped_is_harmless() {
        let (reporter, receiver) = Reporter::channel();
        drop(receiver);
        reporter.log("still fine");
        reporter.finish(Outcome::Failed("nobody listens".into()));
    }

    #[test]
    fn span_interpolates_bytes() {
        let span = Span::new(30, 60);
        assert_eq!(span.at(0, 100), 30);
        assert_eq!(span.at(50, 100), 45);
        assert_eq!(span.at(100, 100), 60);
        assert_eq!(span.at(500, 100), 60);
        assert_eq!(span.at(10, 0), 30);
    }
}
