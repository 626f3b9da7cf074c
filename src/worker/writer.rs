//! Output stage of the file pipeline.
//!
//! Writes processed chunks in order and stops at the first failed one.

use flume::Receiver;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::{CryptoError, Result};
use crate::types::TaskResult;

/// Byte counts for one completed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Throughput {
    /// Input bytes consumed by the cipher.
    pub consumed: u64,

    pub written: u64,
}

#[derive(Default)]
pub struct Writer {
    next: u64,
    throughput: Throughput,
}

impl Writer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes results from the receiver and writes them to `output`.
    ///
    /// # Errors
    ///
    /// Returns the executor's failure as a [`CryptoError::CryptoExecution`],
    /// or an I/O failure from the output.
    pub async fn write_all<W: AsyncWrite + Unpin>(mut self, output: W, receiver: Receiver<TaskResult>) -> Result<Throughput> {
        let mut writer = BufWriter::new(output);

        while let Ok(result) = receiver.recv_async().await {
            self.write_one(&mut writer, result).await?;
        }

        writer.flush().await.map_err(|err| CryptoError::execution(format!("failed to flush output: {err}")))?;
        Ok(self.throughput)
    }

    async fn write_one<W: AsyncWrite + Unpin>(&mut self, writer: &mut W, result: TaskResult) -> Result<()> {
        if let Some(err) = result.error {
            return Err(CryptoError::execution(err.into_string()));
        }
        if result.index != self.next {
            return Err(CryptoError::execution(format!("chunk {} arrived out of order, expected {}", result.index, self.next)));
        }

        writer.write_all(&result.data).await.map_err(|err| CryptoError::execution(format!("failed to write chunk data: {err}")))?;

        self.next += 1;
        self.throughput.consumed += result.size as u64;
        self.throughput.written += result.data.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use flume::unbounded;

    use super::*;

    #[tokio::test]
    async fn test_write_in_order() {
        let mut output = Vec::new();
        let (tx, rx) = unbounded();

        tx.send(TaskResult::ok(0, b"hello".to_vec(), 5)).unwrap();
        tx.send(TaskResult::ok(1, b"world".to_vec(), 6)).unwrap();
        tx.send(TaskResult::ok(2, b"!".to_vec(), 0)).unwrap();
        drop(tx);

        let throughput = Writer::new().write_all(&mut output, rx).await.unwrap();

        assert_eq!(output, b"helloworld!");
        assert_eq!(throughput, Throughput { consumed: 11, written: 11 });
    }

    #[tokio::test]
    async fn test_failed_task_stops_writer() {
        let mut output = Vec::new();
        let (tx, rx) = unbounded();

        tx.send(TaskResult::ok(0, b"partial".to_vec(), 7)).unwrap();
        tx.send(TaskResult::err(1, &CryptoError::execution("pad block corrupted"))).unwrap();
        drop(tx);

        let err = Writer::new().write_all(&mut output, rx).await.unwrap_err();
        assert_eq!(err.to_string(), "pad block corrupted");
    }

    #[tokio::test]
    async fn test_gap_is_rejected() {
        let mut output = Vec::new();
        let (tx, rx) = unbounded();

        tx.send(TaskResult::ok(1, b"world".to_vec(), 5)).unwrap();
        drop(tx);

        assert!(Writer::new().write_all(&mut output, rx).await.is_err());
    }
}
