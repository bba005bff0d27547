//! The background thread a download or playlist action runs on.

use crate::error::Result;
use crate::progress::{Outcome, Reporter};
use std::future::Future;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

pub const WORKER_NAME: &str = "tubesave-worker";

/// Runs `task` on a new named thread with its own single-threaded runtime.
///
/// Whatever the task returns is turned into an [`Outcome`], reported through
/// `reporter` as the last event, and returned from the join handle. Errors
/// never cross the thread boundary as values, only as their message.
pub fn spawn<F, Fut>(reporter: Reporter, task: F) -> Result<JoinHandle<Outcome>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<PathBuf>>,
{
    let handle = thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => match runtime.block_on(task()) {
                    Ok(path) => {
                        reporter.log("Download complete!");
                        reporter.log(format!("File saved to: {}", path.display()));
                        Outcome::Completed(path)
                    }
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                Err(e) => {
                    log::error!("Failed to start the worker runtime: {}", e);
                    Outcome::Failed(e.to_string())
                }
            };
            reporter.finish(outcome.clone());
            outcome
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::progress::Event;

    #[test]
    fn success_is_reported_last() {
        let (reporter, mut receiver) = Reporter::channel();
        let handle = spawn(reporter, || async {
            assert_eq!(thread::current().name(), Some(WORKER_NAME));
            Ok(PathBuf::from("out/song.mp3"))
        })
        .unwrap();
        let outcome = handle.join().unwrap();
        assert_eq!(outcome, Outcome::Completed(PathBuf::from("out/song.mp3")));

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        assert_eq!(events.last(), Some(&Event::Finished(outcome)));
        assert!(events.contains(&Event::Log("Download complete!".into())));
    }

    #[test]
    fn failure_travels_as_text() {
        let (reporter, mut receiver) = Reporter::channel();
        let handle = spawn(reporter, || async {
            Err(Error::StreamUnavailable("audio".into()))
        })
        .unwrap();
        let outcome = handle.join().unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed("No audio stream available for video".into())
        );
        assert_eq!(receiver.try_recv().ok(), Some(Event::Finished(outcome)));
    }
}
