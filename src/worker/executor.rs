//! Cipher stage of the file pipeline.
//!
//! A cipher transform carries chaining state from one chunk to the next, so
//! chunks are processed strictly in arrival order on a single blocking
//! thread. Any failure is forwarded to the writer and ends the stage.

use flume::{Receiver, Sender};

use crate::cipher::Transform;
use crate::types::{Task, TaskResult};

pub struct Executor {
    transform: Box<dyn Transform>,
}

impl Executor {
    #[inline]
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Self { transform }
    }

    /// Runs every task through the transform, then flushes it.
    ///
    /// The final flush is sent with the index after the last chunk and an
    /// input size of zero. Send errors mean the writer has already stopped,
    /// so they end the stage without further reporting.
    pub fn process(mut self, tasks: &Receiver<Task>, results: &Sender<TaskResult>) {
        let mut next = 0u64;

        for task in tasks.iter() {
            next = task.index + 1;
            let result = match self.transform.update(&task.data) {
                Ok(data) => TaskResult::ok(task.index, data, task.data.len()),
                Err(err) => {
                    let _ = results.send(TaskResult::err(task.index, &err));
                    return;
                }
            };
            if results.send(result).is_err() {
                return;
            }
        }

        let tail = match self.transform.finish() {
            Ok(data) => TaskResult::ok(next, data, 0),
            Err(err) => TaskResult::err(next, &err),
        };
        let _ = results.send(tail);
    }
}

#[cfg(test)]
mod tests {
    use flume::unbounded;

    use super::*;
    use crate::cipher::Cipher;
    use crate::material::{IvMaterial, KeyMaterial};
    use crate::types::Direction;

    fn cipher(transform: &str) -> Cipher {
        Cipher::new(transform.parse().unwrap(), &KeyMaterial::from_bytes(b"0123456789abcdef"), &IvMaterial::from_bytes(b"abcdef9876543210")).unwrap()
    }

    fn run(cipher: &Cipher, direction: Direction, chunks: &[&[u8]]) -> Vec<TaskResult> {
        let (task_tx, task_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();
        for (index, chunk) in chunks.iter().enumerate() {
            task_tx.send(Task { data: chunk.to_vec(), index: index as u64 }).unwrap();
        }
        drop(task_tx);

        let input_len = chunks.iter().map(|c| c.len() as u64).sum();
        Executor::new(cipher.transform(direction, input_len).unwrap()).process(&task_rx, &result_tx);
        drop(result_tx);
        result_rx.iter().collect()
    }

    #[test]
    fn test_chunks_match_one_shot() {
        let cipher = cipher("AES/CBC/PKCS5Padding");
        let results = run(&cipher, Direction::Encrypt, &[b"hello ", b"world"]);

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.error.is_none()));
        assert_eq!(results.iter().map(|r| r.index).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(results.iter().map(|r| r.size).sum::<usize>(), 11);

        let joined: Vec<u8> = results.into_iter().flat_map(|r| r.data).collect();
        assert_eq!(joined, cipher.encrypt(b"hello world").unwrap());
    }

    #[test]
    fn test_no_chunks_still_flushes() {
        let cipher = cipher("AES/CBC/PKCS5Padding");
        let results = run(&cipher, Direction::Encrypt, &[]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[0].data, cipher.encrypt(b"").unwrap());
    }

    #[test]
    fn test_finish_failure_is_reported() {
        let cipher = cipher("AES/GCM/NoPadding");
        let results = run(&cipher, Direction::Decrypt, &[&[0u8; 40]]);

        let last = results.last().unwrap();
        assert_eq!(last.index, 1);
        assert_eq!(last.error.as_deref(), Some("authentication failed"));
    }
}
