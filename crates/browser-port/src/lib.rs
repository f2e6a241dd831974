//! Browser-session capability port.
//!
//! The exploration crates never talk to a concrete browser client. They are
//! written against the [`BrowserSession`] trait defined here; the embedding
//! application wires in a real CDP/WebDriver implementation, tests wire in a
//! scripted fake. Every operation carries an explicit timeout and fails with
//! a typed [`BrowserError`] so a missing element degrades to "not found"
//! instead of stalling a run.

pub mod errors;
pub mod model;
pub mod port;

pub use errors::BrowserError;
pub use model::{NodeHandle, NodeSnapshot, Rect, WaitCondition};
pub use port::BrowserSession;
