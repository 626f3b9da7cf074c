//! Terminal output for the command-line front end.
//!
//! Results go to stdout so they can be piped; diagnostics go through
//! `tracing` on stderr.

pub mod display;
