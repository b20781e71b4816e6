//! Anchor tracking: remembers the token sequence behind every YAML anchor.
//!
//! The enclosing parser is strictly forward-only, so an alias cannot be
//! resolved by rewinding the input. Instead, while tokens are produced in a
//! single forward pass, the [`AnchorTracker`] records every token that falls
//! inside a currently-open anchored subtree. When the subtree is fully
//! emitted (the nesting depth returns to where the anchor was declared), the
//! capture is archived; a later alias is then served the archived sequence
//! for replay.
//!
//! The tracker is a passive recorder: it is fed once per produced token and
//! holds no I/O, no lookahead, and no reference to the parser. Replayed
//! tokens take a separate path ([`AnchorTracker::replayed`]) that appends to
//! open captures without disturbing the depth bookkeeping.

use std::fmt;
use std::hash::Hash;

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;

use crate::error::Error;
use crate::tokens::Token;

/// Captured token sequence of one anchor. Scalar anchors capture exactly one
/// token, so the single inline slot keeps them off the heap.
type Captured = SmallVec<[Token; 1]>;

/// Tracked state for one live declaration of an anchor.
#[derive(Debug)]
struct AnchorRecord {
    /// Nesting depth *before* the declaring token was applied: the depth the
    /// anchored value lives at, and the depth that closes the capture.
    start_depth: i32,
    /// Ordered, append-only capture; grows while the record is open.
    captured: Captured,
}

/// Records the token sequence of every anchored node during a single forward
/// parse pass and serves it back when an alias needs to be resolved.
///
/// Keys are generic: the event stream uses the parser-assigned numeric anchor
/// ids, while an interned name string works just as well — any key with
/// stable equality and hashing for the lifetime of one pass does.
///
/// One tracker serves exactly one parse pass. Multiple anchors can be open at
/// once (nested or sibling subtrees); every fed token is appended to *every*
/// open capture, which is what makes an anchor on an outer container pick up
/// the tokens of its anchored descendants.
#[derive(Debug)]
pub struct AnchorTracker<K> {
    /// Current array/mapping nesting depth of the live token stream.
    depth: i32,
    /// Most recent record per anchor key, open or archived.
    registry: AHashMap<K, AnchorRecord>,
    /// Keys whose record is still accumulating tokens.
    active: AHashSet<K>,
}

impl<K> AnchorTracker<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    /// Create an empty tracker at depth 0.
    pub fn new() -> Self {
        Self {
            depth: 0,
            registry: AHashMap::new(),
            active: AHashSet::new(),
        }
    }

    /// Record one live token.
    ///
    /// Arguments:
    /// - `declared`: anchor key if this token is the first token of a newly
    ///   anchor-tagged node, `None` otherwise.
    /// - `token`: the produced token, in production order.
    ///
    /// In order: a declared anchor opens a fresh record at the pre-token
    /// depth (overriding any earlier record under the same key — YAML permits
    /// re-declaring an anchor, and only the most recent declaration is
    /// observable afterwards); the token's nesting delta is applied; the
    /// token is appended to every open record, including the one just opened
    /// (a capture contains its own declaring token); finally every record
    /// whose start depth equals the new depth is archived. A scalar-anchored
    /// value therefore closes within the same call, a container-anchored one
    /// on its matching end token.
    ///
    /// Must not be called for tokens that are themselves being replayed from
    /// a capture; those go through [`replayed`](Self::replayed) instead.
    ///
    /// Errors:
    /// - `DepthUnderflow` if a close token would make the depth negative,
    ///   which a well-nested upstream stream never produces.
    pub fn feed(&mut self, declared: Option<K>, token: Token) -> Result<(), Error> {
        if let Some(name) = declared {
            self.registry.insert(
                name.clone(),
                AnchorRecord {
                    start_depth: self.depth,
                    captured: Captured::new(),
                },
            );
            // Insert is idempotent: if a still-open record under this name
            // was just replaced, the name is already here and the orphaned
            // record is simply never completed.
            self.active.insert(name);
        }

        self.depth += token.kind.depth_delta();
        if self.depth < 0 {
            return Err(Error::depth_underflow().with_location(token.location));
        }

        for name in &self.active {
            if let Some(record) = self.registry.get_mut(name) {
                record.captured.push(token.clone());
            }
        }

        // Close every record whose subtree just completed. `retain` keeps the
        // removal safe while traversing the set.
        let depth = self.depth;
        let registry = &self.registry;
        self.active
            .retain(|name| registry.get(name).is_some_and(|record| record.start_depth != depth));

        Ok(())
    }

    /// Record one replayed token into every open capture.
    ///
    /// Replay bypasses [`feed`](Self::feed): a replayed buffer is balanced,
    /// so it neither moves the live depth counter nor closes any record.
    /// Open captures still need its tokens, though — an anchored container
    /// whose body contains an alias must replay the aliased content too.
    pub fn replayed(&mut self, token: &Token) {
        if self.active.is_empty() {
            return;
        }
        for name in &self.active {
            if let Some(record) = self.registry.get_mut(name) {
                record.captured.push(token.clone());
            }
        }
    }

    /// True while the key's current record is still accumulating tokens.
    ///
    /// Used by:
    /// - The event stream to reject aliases that appear inside their own
    ///   anchor's subtree; a legal forward-only document aliases only
    ///   archived captures.
    pub fn is_open(&self, name: &K) -> bool {
        self.active.contains(name)
    }

    /// Serve the captured token sequence of a previously declared anchor.
    ///
    /// Returns the capture by reference, never a copy; in a well-formed
    /// forward-only document the record is always archived by the time an
    /// alias referencing it can appear, so the slice is final.
    ///
    /// Errors:
    /// - `UnresolvedAnchor` if the key was never declared in this pass: the
    ///   document contains a dangling alias.
    pub fn lookup(&self, name: &K) -> Result<&[Token], Error> {
        match self.registry.get(name) {
            Some(record) => Ok(record.captured.as_slice()),
            None => Err(Error::unresolved_anchor(name.to_string())),
        }
    }
}

impl<K> Default for AnchorTracker<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
