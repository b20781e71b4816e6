//! Anchor tracking and alias replay for streaming YAML.
//!
//! A pull-based YAML parse cannot rewind its input, so an alias (`*name`)
//! cannot be resolved by re-reading the anchored node's source text. This
//! crate records the token sequence of every anchored node while it streams
//! by, and replays the capture when an alias references it:
//!
//! ```
//! use saphyr_replay::{AliasLimits, EventStream, Events, TokenKind};
//!
//! let mut events = EventStream::new("[&a hi, *a]", AliasLimits::default());
//! let mut scalars = Vec::new();
//! while let Some(token) = events.next().unwrap() {
//!     if token.kind == TokenKind::Scalar {
//!         scalars.push(token.payload.unwrap().value);
//!     }
//! }
//! assert_eq!(scalars, ["hi", "hi"]);
//! ```
//!
//! The capture bookkeeping lives in [`AnchorTracker`]; [`EventStream`] wraps
//! `saphyr_parser::Parser` and drives the tracker, with [`AliasLimits`]
//! guarding against alias bombs. All failures are returned as [`Error`]
//! values with source locations; nothing panics on malformed input.

pub use crate::error::{Error, Location};
pub use crate::options::AliasLimits;
pub use crate::stream::{EventStream, Events};
pub use crate::tokens::{Payload, Token, TokenKind};
pub use crate::tracker::AnchorTracker;

mod error;
mod options;
mod stream;
mod tokens;
mod tracker;
