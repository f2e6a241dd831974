//! Active-surface resolution and interactive element discovery.
//!
//! Given a live [`browser_port::BrowserSession`], this crate answers two
//! questions for the exploration loop: *where* should the agent look (the
//! currently active interactive surface, see [`ScopeResolver`]) and *what*
//! can it interact with there (see [`Discoverer`]). Discovery output is a
//! flat list of [`ElementDescriptor`]s with stable, human-readable selector
//! strings synthesized by [`selector::synthesize`] and decorative chrome
//! removed by the [`noise`] filter.

pub mod discover;
pub mod errors;
pub mod model;
pub mod noise;
pub mod scope;
pub mod selector;

pub use discover::Discoverer;
pub use errors::ScanError;
pub use model::{ElementDescriptor, ElementKind};
pub use scope::{ActiveScope, ScopeOrigin, ScopeResolver};
