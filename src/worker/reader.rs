//! Input stage of the file pipeline.
//!
//! Reads the source in fixed-size chunks and hands each one to the executor
//! as a numbered [`Task`]. The bounded channel provides backpressure: the
//! reader never runs more than a few chunks ahead of the cipher.

use flume::Sender;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::debug;

use crate::error::{CryptoError, Result};
use crate::types::Task;

pub struct Reader {
    chunk_size: usize,
}

impl Reader {
    /// # Errors
    ///
    /// Fails if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CryptoError::execution("chunk size must be positive"));
        }
        Ok(Self { chunk_size })
    }

    /// Reads `input` to the end, sending one task per chunk.
    ///
    /// Returns the number of bytes read. If the executor hangs up early the
    /// reader stops quietly; the executor reports its own failure.
    pub async fn read_all<R: AsyncRead + Unpin>(&self, input: R, sender: &Sender<Task>) -> Result<u64> {
        let mut reader = BufReader::new(input);
        let mut index = 0u64;
        let mut total = 0u64;

        loop {
            let mut buffer = vec![0u8; self.chunk_size];
            let filled = Self::fill(&mut reader, &mut buffer).await?;
            if filled == 0 {
                break;
            }
            buffer.truncate(filled);
            total += filled as u64;

            if sender.send_async(Task { data: buffer, index }).await.is_err() {
                debug!(chunk = index, "executor closed, reader stopping");
                break;
            }
            index += 1;

            if filled < self.chunk_size {
                break;
            }
        }

        Ok(total)
    }

    /// Reads until `buffer` is full or the input ends.
    async fn fill<R: AsyncRead + Unpin>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buffer.len() {
            let n = reader.read(&mut buffer[filled..]).await.map_err(|err| CryptoError::execution(format!("failed to read chunk: {err}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use flume::unbounded;

    use super::*;

    #[tokio::test]
    async fn test_read_fixed_chunks() {
        let reader = Reader::new(1024).unwrap();

        let data = vec![1u8; 1024 + 100];
        let (tx, rx) = unbounded();

        let total = reader.read_all(Cursor::new(&data), &tx).await.unwrap();
        drop(tx);
        assert_eq!(total, 1124);

        let task1 = rx.recv_async().await.unwrap();
        assert_eq!(task1.index, 0);
        assert_eq!(task1.data.len(), 1024);

        let task2 = rx.recv_async().await.unwrap();
        assert_eq!(task2.index, 1);
        assert_eq!(task2.data.len(), 100);

        assert!(rx.recv_async().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let reader = Reader::new(16).unwrap();
        let (tx, rx) = unbounded();

        assert_eq!(reader.read_all(Cursor::new(Vec::new()), &tx).await.unwrap(), 0);
        drop(tx);
        assert!(rx.recv_async().await.is_err());
    }

    #[tokio::test]
    async fn test_closed_channel_stops_quietly() {
        let reader = Reader::new(4).unwrap();
        let (tx, rx) = unbounded();
        drop(rx);

        assert!(reader.read_all(Cursor::new(vec![0u8; 64]), &tx).await.is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(Reader::new(0).is_err());
    }
}
