//!
//! Event stream: a compact pull layer over `saphyr_parser::Parser` with
//! anchor capture and alias replay.
//!
//! Responsibilities
//! - Provide owned, simplified tokens ([`Token`]) to the consumer.
//! - Hide stream/document markers; expose only logical data tokens.
//! - Track source locations for diagnostics.
//! - Feed every live token to the [`AnchorTracker`] and replay captures on
//!   aliases.
//! - Enforce alias-replay limits.
//!
//! Anchors and aliases
//! - A token whose raw event carries an anchor id is fed to the tracker with
//!   that id declared; the tracker does all capture bookkeeping.
//! - Alias `*id`: look the capture up, push it onto the replay stack
//!   (`inject`) and serve its tokens. Enforce:
//!   - `max_total_replayed_tokens` (document-wide),
//!   - `max_alias_expansions_per_anchor` (per id),
//!   - `max_replay_stack_depth` (nested replays).
//! - Replayed tokens bypass the tracker's live `feed` path (playback is not
//!   new input), but still land in any capture that is currently open, so an
//!   anchored container picks up the content of aliases inside it.
//!
//! Token flow
//! - If a replay buffer is pending, serve from it first.
//! - Otherwise, pull the next parser event and translate into [`Token`],
//!   skipping stream/doc markers.
//! - Maintain one-item lookahead (`look`).
//!
//! Document boundaries
//! - On `---`/`...`, swap in a fresh tracker and clear replay buffers and
//!   alias-expansion counters. A tracker serves exactly one document pass.

use std::borrow::Cow;

use ahash::AHashMap;
use saphyr_parser::{Event, Parser, StrInput};

use crate::error::{location_from_span, Error, Location};
use crate::options::AliasLimits;
use crate::tokens::{Payload, Token, TokenKind};
use crate::tracker::AnchorTracker;

/// Source of tokens with lookahead and alias replay.
///
/// The consumer cannot distinguish a live token from a replayed one; both
/// arrive through [`next`](Events::next) in document order.
pub trait Events {
    /// Pull the next token from the stream.
    ///
    /// Returns:
    /// - `Ok(Some(Token))` for a real token,
    /// - `Ok(None)` at true end-of-stream,
    /// - `Err(Error)` on parser/structure failure.
    fn next(&mut self) -> Result<Option<Token>, Error>;

    /// Peek at the next token without consuming it.
    fn peek(&mut self) -> Result<Option<Token>, Error>;

    /// Location of the last yielded token, for error reporting.
    fn last_location(&self) -> Location;
}

/// Live token source that wraps `saphyr_parser::Parser` and:
/// - Skips stream/document markers
/// - Records anchored subtrees through the [`AnchorTracker`]
/// - Resolves aliases by injecting captured buffers (replaying)
pub struct EventStream<'a> {
    /// Underlying streaming parser that produces raw events from the input.
    parser: Parser<'a, StrInput<'a>>,
    /// Single-item lookahead buffer (peeked token not yet consumed).
    look: Option<Token>,
    /// For alias replay: a stack of injected buffers; we always read from the
    /// top first.
    inject: Vec<(Vec<Token>, usize)>,
    /// Anchor capture bookkeeping, keyed by parser-assigned anchor id.
    tracker: AnchorTracker<usize>,

    /// Location of the last yielded token (for better error reporting).
    last_location: Location,

    /// Hard limit configuration for alias replaying.
    alias_limits: AliasLimits,
    /// Total number of replayed tokens across the whole document (enforced by
    /// `alias_limits`).
    total_replayed_tokens: usize,
    /// Per-anchor replay expansion counters: anchor id -> number of expansions.
    per_anchor_expansions: AHashMap<usize, usize>,
}

impl<'a> EventStream<'a> {
    /// Create a new token source.
    ///
    /// # Parameters
    /// - `input`: YAML source string.
    /// - `alias_limits`: Alias replay limits to mitigate alias bombs.
    pub fn new(input: &'a str, alias_limits: AliasLimits) -> Self {
        Self {
            parser: Parser::new_from_str(input),
            look: None,
            inject: Vec::new(),
            tracker: AnchorTracker::new(),

            last_location: Location::UNKNOWN,

            alias_limits,
            total_replayed_tokens: 0,
            per_anchor_expansions: AHashMap::new(),
        }
    }

    /// Core token pump: pulls the next logical token.
    ///
    /// Order of precedence:
    /// - If there is an injected replay buffer (from an alias), serve from it
    ///   first. Replayed tokens skip the live `feed` path but are appended
    ///   to any open captures.
    /// - Otherwise, pull from the underlying parser, skipping stream/document
    ///   markers, and feed each live token to the tracker once.
    ///
    /// Returns Some(token) when a token is produced, or Ok(None) on true EOF.
    fn next_impl(&mut self) -> Result<Option<Token>, Error> {
        // 1) Serve from injected buffers first (alias replay)
        if let Some((buf, idx)) = self.inject.last_mut() {
            if *idx < buf.len() {
                let token = buf[*idx].clone();
                *idx += 1;
                if *idx == buf.len() {
                    self.inject.pop();
                }
                self.total_replayed_tokens = self
                    .total_replayed_tokens
                    .checked_add(1)
                    .ok_or_else(|| Error::msg("alias replay counter overflow"))
                    .map_err(|err| err.with_location(token.location))?;
                if self.total_replayed_tokens > self.alias_limits.max_total_replayed_tokens {
                    return Err(Error::msg(format!(
                        "alias replay limit exceeded: total_replayed_tokens={} > {}",
                        self.total_replayed_tokens, self.alias_limits.max_total_replayed_tokens
                    ))
                    .with_location(token.location));
                }
                self.tracker.replayed(&token);
                self.last_location = token.location;
                return Ok(Some(token));
            } else {
                self.inject.pop();
            }
        }

        // 2) Pull from the real parser
        while let Some(item) = self.parser.next() {
            let (raw, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);

            match raw {
                Event::StreamStart | Event::StreamEnd => {
                    // Skip stream markers.
                    self.last_location = location;
                    continue;
                }

                Event::DocumentStart(_) | Event::DocumentEnd => {
                    // Skip document markers and reset per-document state.
                    self.reset_document_state();
                    self.last_location = location;
                    continue;
                }

                Event::Scalar(val, style, anchor_id, tag) => {
                    let value = match val {
                        Cow::Borrowed(v) => v.to_string(),
                        Cow::Owned(v) => v,
                    };
                    let payload = Payload {
                        value,
                        style,
                        tag: tag.map(|t| t.to_string()),
                    };
                    let token = Token::scalar(payload, location);
                    return self.emit(anchor_id, token);
                }

                Event::SequenceStart(anchor_id, _tag) => {
                    let token = Token::structural(TokenKind::SeqStart, location);
                    return self.emit(anchor_id, token);
                }
                Event::SequenceEnd => {
                    let token = Token::structural(TokenKind::SeqEnd, location);
                    return self.emit(0, token);
                }

                Event::MappingStart(anchor_id, _tag) => {
                    let token = Token::structural(TokenKind::MapStart, location);
                    return self.emit(anchor_id, token);
                }
                Event::MappingEnd => {
                    let token = Token::structural(TokenKind::MapEnd, location);
                    return self.emit(0, token);
                }

                Event::Alias(anchor_id) => {
                    // A forward-only document can only alias archived
                    // captures; an alias inside its own anchor's subtree
                    // would replay a half-finished buffer.
                    if self.tracker.is_open(&anchor_id) {
                        return Err(Error::msg(format!(
                            "alias references anchor id {anchor_id} inside its own subtree"
                        ))
                        .with_location(location));
                    }
                    let buf: Vec<Token> = self
                        .tracker
                        .lookup(&anchor_id)
                        .map_err(|err| err.with_location(location))?
                        .to_vec();

                    let count = self
                        .per_anchor_expansions
                        .entry(anchor_id)
                        .and_modify(|c| *c += 1)
                        .or_insert(1);
                    if *count > self.alias_limits.max_alias_expansions_per_anchor {
                        return Err(Error::msg(format!(
                            "alias expansion limit exceeded for anchor id {}: {} > {}",
                            anchor_id, count, self.alias_limits.max_alias_expansions_per_anchor
                        ))
                        .with_location(location));
                    }

                    // Push for replay; enforce stack depth limit.
                    let next_depth = self.inject.len() + 1;
                    if next_depth > self.alias_limits.max_replay_stack_depth {
                        return Err(Error::msg(format!(
                            "alias replay stack depth exceeded: depth={} > {}",
                            next_depth, self.alias_limits.max_replay_stack_depth
                        ))
                        .with_location(location));
                    }
                    self.inject.push((buf, 0));
                    return self.next_impl();
                }

                Event::Nothing => continue,
            }
        }

        Ok(None)
    }

    /// Feed a live token to the tracker and yield it.
    ///
    /// `anchor_id` is the parser-assigned id carried by the raw event, 0 when
    /// the node is not anchored.
    fn emit(&mut self, anchor_id: usize, token: Token) -> Result<Option<Token>, Error> {
        let declared = (anchor_id != 0).then_some(anchor_id);
        self.tracker.feed(declared, token.clone())?;
        self.last_location = token.location;
        Ok(Some(token))
    }

    /// Reset per-document state when encountering a document boundary.
    ///
    /// Swaps in a fresh tracker (one tracker per document pass), clears
    /// injected replay buffers and alias-expansion counters.
    fn reset_document_state(&mut self) {
        self.tracker = AnchorTracker::new();
        self.inject.clear();
        self.per_anchor_expansions.clear();
        self.total_replayed_tokens = 0;
    }
}

impl<'a> Events for EventStream<'a> {
    /// Get the next token, using a single-item lookahead buffer if present.
    /// Updates last_location to the yielded token's location.
    fn next(&mut self) -> Result<Option<Token>, Error> {
        if let Some(token) = self.look.take() {
            self.last_location = token.location;
            return Ok(Some(token));
        }
        self.next_impl()
    }

    /// Peek at the next token without consuming it, filling the lookahead
    /// buffer if empty.
    fn peek(&mut self) -> Result<Option<Token>, Error> {
        if self.look.is_none() {
            self.look = self.next_impl()?;
        }
        Ok(self.look.clone())
    }

    fn last_location(&self) -> Location {
        self.last_location
    }
}
