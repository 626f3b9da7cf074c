//! Streaming file worker.
//!
//! Connects three stages with bounded `flume` channels:
//!
//! - a [`Reader`] task that chunks the input,
//! - an [`Executor`] on tokio's blocking pool that runs the cipher,
//! - a [`Writer`] that writes results in order on the calling task.
//!
//! Memory stays bounded by the chunk size times the channel depth. OCB is
//! the exception: it holds the whole message until `finish`.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::cipher::Cipher;
use crate::config::{CHANNEL_SIZE, CHUNK_SIZE};
use crate::error::{CryptoError, Result};
use crate::types::Direction;
use crate::worker::executor::Executor;
use crate::worker::reader::Reader;
use crate::worker::writer::{Throughput, Writer};

pub mod executor;
pub mod reader;
pub mod writer;

pub struct Worker {
    cipher: Cipher,
    direction: Direction,
    input_len: u64,
    chunk_size: usize,
}

impl Worker {
    /// `input_len` is the number of bytes `process` will read; CCM encodes
    /// it before the first block.
    #[inline]
    pub fn new(cipher: Cipher, direction: Direction, input_len: u64) -> Self {
        Self { cipher, direction, input_len, chunk_size: CHUNK_SIZE }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Streams `input` through the cipher into `output`.
    ///
    /// A read failure takes precedence over what the later stages report,
    /// since they only saw a truncated stream.
    pub async fn process<R, W>(self, input: R, output: W) -> Result<Throughput>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let transform = self.cipher.transform(self.direction, self.input_len)?;
        let reader = Reader::new(self.chunk_size)?;

        let (task_sender, task_receiver) = flume::bounded(CHANNEL_SIZE);
        let (result_sender, result_receiver) = flume::bounded(CHANNEL_SIZE);

        let reader_handle = tokio::spawn(async move { reader.read_all(input, &task_sender).await });

        let executor = Executor::new(transform);
        let executor_handle = tokio::task::spawn_blocking(move || executor.process(&task_receiver, &result_sender));

        let write_result = Writer::new().write_all(output, result_receiver).await;
        let read_result = reader_handle.await.map_err(|_| CryptoError::execution("reader task panicked"))?;
        executor_handle.await.map_err(|_| CryptoError::execution("executor task panicked"))?;

        let read = read_result?;
        let throughput = write_result?;
        debug!(read, written = throughput.written, "{}", self.direction.progress_label());
        Ok(throughput)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::material::{IvMaterial, KeyMaterial};

    fn cipher(transform: &str) -> Cipher {
        let iv: &[u8] = if transform.contains("/CCM/") { b"abcdef987654" } else { b"abcdef9876543210" };
        Cipher::new(transform.parse().unwrap(), &KeyMaterial::from_bytes(b"0123456789abcdef"), &IvMaterial::from_bytes(iv)).unwrap()
    }

    #[tokio::test]
    async fn test_stream_matches_one_shot() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        for transform in ["AES/CBC/PKCS5Padding", "Twofish/CFB/NoPadding", "AES/CCM/NoPadding", "AES/EAX/NoPadding"] {
            let cipher = cipher(transform);
            let mut encrypted = Vec::new();
            let throughput = Worker::new(cipher.clone(), Direction::Encrypt, data.len() as u64).with_chunk_size(1000).process(Cursor::new(data.clone()), &mut encrypted).await.unwrap();

            assert_eq!(encrypted, cipher.encrypt(&data).unwrap(), "{transform}");
            assert_eq!(throughput.consumed, data.len() as u64);
            assert_eq!(throughput.written, encrypted.len() as u64);

            let mut decrypted = Vec::new();
            let len = encrypted.len() as u64;
            Worker::new(cipher, Direction::Decrypt, len).with_chunk_size(777).process(Cursor::new(encrypted), &mut decrypted).await.unwrap();
            assert_eq!(decrypted, data, "{transform}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_padding_fails() {
        let cipher = cipher("AES/CBC/PKCS5Padding");
        let mut output = Vec::new();
        let result = Worker::new(cipher, Direction::Decrypt, 63).process(Cursor::new(vec![7u8; 63]), &mut output).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let cipher = cipher("AES/CTR/NoPadding");
        let mut output = Vec::new();
        let throughput = Worker::new(cipher, Direction::Encrypt, 0).process(Cursor::new(Vec::new()), &mut output).await.unwrap();
        assert!(output.is_empty());
        assert_eq!(throughput, Throughput::default());
    }
}
