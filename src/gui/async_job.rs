//! Background job handle polled from the GUI thread.
//!
//! A job runs on its own thread and reports exactly once over a channel.
//! A worker that goes away without reporting counts as a failure.

use anyhow::{anyhow, Result};
use std::sync::mpsc::{Receiver, TryRecvError};

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T>>>,
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T>>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    /// `Some` once, when the job has finished; `None` while it runs and afterwards.
    pub fn poll(&mut self) -> Option<Result<T>> {
        let outcome = match self.receiver.as_ref()?.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(anyhow!("Worker task disconnected")),
        };
        self.receiver = None;
        Some(outcome)
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_poll_pending_then_done() {
        let (tx, rx) = mpsc::channel();
        let mut job: AsyncJob<u32> = AsyncJob::new(rx);

        assert!(job.poll().is_none());
        assert!(job.is_running());

        tx.send(Ok(7)).unwrap();
        assert_eq!(job.poll().unwrap().unwrap(), 7);
        assert!(!job.is_running());
        assert!(job.poll().is_none());
    }

    #[test]
    fn test_poll_reports_job_error() {
        let (tx, rx) = mpsc::channel();
        let mut job: AsyncJob<()> = AsyncJob::new(rx);
        tx.send(Err(anyhow!("rpc unreachable"))).unwrap();
        assert!(job.poll().unwrap().unwrap_err().to_string().contains("rpc unreachable"));
    }

    #[test]
    fn test_dropped_worker_is_an_error() {
        let (tx, rx) = mpsc::channel::<Result<()>>();
        let mut job = AsyncJob::new(rx);
        drop(tx);
        let err = job.poll().unwrap().unwrap_err();
        assert!(err.to_string().contains("disconnected"));
        assert!(!job.is_running());
    }
}
