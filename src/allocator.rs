//! Global allocator.
//!
//! The engine allocates many short-lived buffers (chunks, per-line
//! messages, padded blocks); mimalloc handles that pattern well.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
