//! Runs jobs off the caller's thread, one at a time.
//!
//! A [`Coordinator`] owns a busy flag. [`Coordinator::submit`] claims it or
//! fails with [`CryptoError::Busy`]; the job then runs on the tokio runtime
//! and its single outcome is delivered through a [`JobHandle`]. The flag is
//! released when the job ends, including when it panics.
//!
//! Coordinators share nothing, so separate instances may run jobs
//! concurrently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flume::Receiver;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::error::{CryptoError, Result};
use crate::types::{CryptoJobRequest, CryptoJobResult, Target};
use crate::{file, text};

pub struct Coordinator {
    busy: Arc<AtomicBool>,
    runtime: Handle,
}

impl Coordinator {
    /// Creates a coordinator that spawns its jobs on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self { busy: Arc::new(AtomicBool::new(false)), runtime }
    }

    /// Creates a coordinator bound to the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn try_current() -> Result<Self> {
        Handle::try_current().map(Self::new).map_err(|err| CryptoError::execution(err.to_string()))
    }

    /// Returns `true` while a submitted job has not finished.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Starts `request` in the background.
    ///
    /// Returns immediately. Configuration, decoding and material errors are
    /// delivered through the handle like any other outcome.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Busy`] if a job from this coordinator is still running.
    pub fn submit(&self, request: CryptoJobRequest) -> Result<JobHandle> {
        self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).map_err(|_| CryptoError::Busy)?;
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (sender, receiver) = flume::bounded(1);
        self.runtime.spawn(async move {
            info!("{}", request.summary());
            let outcome = execute(request).await;

            match &outcome {
                Ok(result) if result.is_complete() => info!("job completed"),
                Ok(result) => warn!(failed = result.failures().len(), "job completed with failures"),
                Err(err) => warn!(error = %err, "job failed"),
            }

            // The slot is free before the outcome becomes observable.
            drop(guard);
            let _ = sender.send(outcome);
        });

        Ok(JobHandle { receiver })
    }
}

/// Runs one job to completion. The request, and the key and IV it owns,
/// is dropped when this returns.
async fn execute(request: CryptoJobRequest) -> Result<CryptoJobResult> {
    match request.target() {
        Target::Text => {
            let output = tokio::task::spawn_blocking(move || text::run(&request)).await.map_err(|_| CryptoError::JobLost)??;
            Ok(CryptoJobResult::Text(output))
        }
        Target::File => Ok(CryptoJobResult::Files(file::run(&request).await?)),
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The pending outcome of one submitted job.
///
/// Consumed by waiting, so the outcome is observed exactly once.
#[must_use = "a job's outcome is only available through its handle"]
pub struct JobHandle {
    receiver: Receiver<Result<CryptoJobResult>>,
}

impl JobHandle {
    /// Waits for the outcome.
    ///
    /// # Errors
    ///
    /// The job's own error, or [`CryptoError::JobLost`] if the job ended
    /// without reporting.
    pub async fn wait(self) -> Result<CryptoJobResult> {
        self.receiver.recv_async().await.map_err(|_| CryptoError::JobLost)?
    }

    /// Blocking variant of [`JobHandle::wait`] for callers outside the runtime.
    pub fn wait_blocking(self) -> Result<CryptoJobResult> {
        self.receiver.recv().map_err(|_| CryptoError::JobLost)?
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::material::{IvMaterial, KeyMaterial};
    use crate::types::Direction;

    fn text_request(direction: Direction, input: &str) -> CryptoJobRequest {
        CryptoJobRequest::text(
            "AES/CBC/PKCS5Padding".parse().unwrap(),
            KeyMaterial::from_bytes(b"0123456789abcdef"),
            IvMaterial::from_bytes(b"abcdef9876543210"),
            direction,
            input,
        )
    }

    #[tokio::test]
    async fn test_text_job_delivers_result() {
        let coordinator = Coordinator::new(Handle::current());
        let result = coordinator.submit(text_request(Direction::Encrypt, "hello world")).unwrap().wait().await.unwrap();

        let CryptoJobResult::Text(output) = result else { panic!("expected text output") };
        assert_eq!(output.text, "4dc2f2b42aab28100de8f7e16a71291b");
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_second_submit_is_rejected_while_busy() {
        let coordinator = Coordinator::new(Handle::current());

        let first = coordinator.submit(text_request(Direction::Encrypt, "one")).unwrap();
        assert!(coordinator.is_busy());
        assert!(matches!(coordinator.submit(text_request(Direction::Encrypt, "two")), Err(CryptoError::Busy)));

        first.wait().await.unwrap();
        assert!(!coordinator.is_busy());
        coordinator.submit(text_request(Direction::Encrypt, "three")).unwrap().wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_separate_coordinators_do_not_share_state() {
        let a = Coordinator::new(Handle::current());
        let b = Coordinator::new(Handle::current());

        let first = a.submit(text_request(Direction::Encrypt, "one")).unwrap();
        let second = b.submit(text_request(Direction::Encrypt, "two")).unwrap();
        assert!(first.wait().await.is_ok());
        assert!(second.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_job_error_is_delivered_and_frees_slot() {
        let coordinator = Coordinator::new(Handle::current());
        let mut request = text_request(Direction::Decrypt, "00");
        request.key = KeyMaterial::from_bytes(b"");

        let err = coordinator.submit(request).unwrap().wait().await.unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyLength { len: 0, .. }));
        assert!(!coordinator.is_busy());
    }

    #[tokio::test]
    async fn test_file_job() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        tokio::fs::write(&path, "some file content").await.unwrap();

        let request = CryptoJobRequest::files(
            "Camellia/CTR/NoPadding".parse().unwrap(),
            KeyMaterial::from_bytes(b"0123456789abcdef"),
            IvMaterial::from_bytes(b"abcdef9876543210"),
            Direction::Encrypt,
            vec![path.clone()],
        );
        let coordinator = Coordinator::new(Handle::current());
        let CryptoJobResult::Files(output) = coordinator.submit(request).unwrap().wait().await.unwrap() else { panic!("expected file output") };

        assert_eq!(output.output_paths(), [dir.path().join("plain.txt.enc").as_path()]);
        assert_eq!(output.reports[0].bytes_written, 17);
    }

    #[tokio::test]
    async fn test_dropped_sender_reports_job_lost() {
        let (sender, receiver) = flume::bounded::<Result<CryptoJobResult>>(1);
        drop(sender);
        assert!(matches!(JobHandle { receiver }.wait().await, Err(CryptoError::JobLost)));
    }

    #[test]
    fn test_wait_blocking_outside_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).build().unwrap();
        let coordinator = Coordinator::new(runtime.handle().clone());

        let result = coordinator.submit(text_request(Direction::Decrypt, "4dc2f2b42aab28100de8f7e16a71291b")).unwrap().wait_blocking().unwrap();
        let CryptoJobResult::Text(output) = result else { panic!("expected text output") };
        assert_eq!(output.text, "hello world");
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(Coordinator::try_current().is_err());
    }
}
