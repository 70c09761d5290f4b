//! Background conversion worker
//!
//! ffmpeg runs on a worker thread; status events come back over a channel so
//! the front-end thread stays free to render them. One conversion at a time.

use crate::conversion_api::{ConversionConfig, ConversionOutcome, GifConverter};
use crate::status::StatusEvent;
use shared_utils::{GifDropError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

#[derive(Debug, Default, Clone)]
pub struct ConversionWorker {
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the worker thread ends, panics included.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ConversionHandle {
    pub events: Receiver<StatusEvent>,
    join: JoinHandle<Result<ConversionOutcome>>,
}

impl ConversionHandle {
    /// Blocks until the conversion ends. Events not yet received stay
    /// readable on `events`.
    pub fn wait(self) -> Result<ConversionOutcome> {
        self.join.join().unwrap_or_else(|_| {
            error!("Conversion worker panicked");
            Err(GifDropError::WorkerPanicked)
        })
    }
}

impl ConversionWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Starts `config` on a new thread.
    ///
    /// # Errors
    /// - [`GifDropError::Busy`] while a previous conversion is still running
    /// - [`GifDropError::Io`] if the thread cannot be spawned
    pub fn start(&self, config: ConversionConfig) -> Result<ConversionHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Rejected conversion request: worker busy");
            return Err(GifDropError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (tx, rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("gif-conversion".to_string())
            .spawn(move || {
                let _guard = guard;
                let converter = GifConverter::new(config)?;
                converter.convert(&tx)
            })?;

        Ok(ConversionHandle { events: rx, join })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use std::path::PathBuf;

    #[test]
    fn test_new_worker_is_idle() {
        assert!(!ConversionWorker::new().is_busy());
    }

    #[test]
    fn test_failed_start_releases_busy_flag() {
        let worker = ConversionWorker::new();
        let config = ConversionConfig::new(
            PathBuf::from("/nonexistent/giffy/clip.mp4"),
            Profile::Avatar,
        );
        let handle = worker.start(config).unwrap();
        assert!(matches!(handle.wait(), Err(GifDropError::InputNotFound(_))));
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_second_start_while_busy_is_rejected() {
        let worker = ConversionWorker::new();
        worker.busy.store(true, Ordering::SeqCst);
        let config = ConversionConfig::new("clip.mp4", Profile::Avatar);
        let err = worker.start(config).err().unwrap();
        assert!(matches!(err, GifDropError::Busy));
        assert!(err.user_message().contains("Please wait"));
    }

    #[test]
    fn test_clones_share_busy_state() {
        let worker = ConversionWorker::new();
        let other = worker.clone();
        worker.busy.store(true, Ordering::SeqCst);
        assert!(other.is_busy());
    }
}
