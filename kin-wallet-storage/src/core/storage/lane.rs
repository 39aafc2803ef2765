//! Single ordered lane for file access
//!
//! Every file read and write of one storage instance runs on a dedicated
//! worker thread, one job at a time, in submission order. Callers await the
//! result through a oneshot channel. The worker exits once the last handle
//! to the lane is dropped and the queue is drained.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tokio::sync::{mpsc, oneshot};

use crate::shared::constants::ACCESS_LANE_THREAD_NAME;
use crate::shared::error::{StorageError, StorageResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct AccessLane {
    sender: mpsc::UnboundedSender<Job>,
}

impl AccessLane {
    pub fn spawn() -> StorageResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        thread::Builder::new()
            .name(ACCESS_LANE_THREAD_NAME.to_string())
            .spawn(move || {
                while let Some(job) = receiver.blocking_recv() {
                    // The job's reply sender is dropped while unwinding, so its caller sees Unknown
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        log::warn!("Storage job panicked; lane continues with the next job");
                    }
                }
                log::debug!("Access lane stopped");
            })?;

        Ok(Self { sender })
    }

    /// Enqueue `op` and wait for its result
    pub async fn run<F, T>(&self, op: F) -> StorageResult<T>
    where
        F: FnOnce() -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let job: Job = Box::new(move || {
            let _ = reply.send(op());
        });

        self.sender
            .send(job)
            .map_err(|_| StorageError::unknown("access lane is closed"))?;

        result
            .await
            .map_err(|_| StorageError::unknown("access lane dropped the operation"))?
    }
}
