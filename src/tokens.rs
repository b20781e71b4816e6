//! Owned parse tokens: the unit of both live streaming and anchor capture.

use saphyr_parser::ScalarStyle;

use crate::error::Location;

/// Structural classification of a parse token.
///
/// Only two properties matter for anchor bookkeeping: whether a token opens a
/// nesting level and whether it closes one. Everything else is
/// nesting-neutral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Start of a sequence (`[` / `-`-list).
    SeqStart,
    /// End of a sequence.
    SeqEnd,
    /// Start of a mapping (`{` or block mapping).
    MapStart,
    /// End of a mapping.
    MapEnd,
    /// Scalar value (text); the reconstruction data lives in [`Payload`].
    Scalar,
}

impl TokenKind {
    /// True for container-open tokens.
    pub fn is_open(self) -> bool {
        matches!(self, TokenKind::SeqStart | TokenKind::MapStart)
    }

    /// True for container-close tokens.
    pub fn is_close(self) -> bool {
        matches!(self, TokenKind::SeqEnd | TokenKind::MapEnd)
    }

    /// Nesting contribution of this token: +1 for opens, -1 for closes,
    /// 0 for everything else.
    pub fn depth_delta(self) -> i32 {
        if self.is_open() {
            1
        } else if self.is_close() {
            -1
        } else {
            0
        }
    }
}

/// Data sufficient to re-materialize a scalar later, without re-reading
/// source text: the raw lexical content plus quoting/style metadata.
///
/// Structural tokens carry no payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    /// Raw scalar text as produced by the tokenizer.
    pub value: String,
    /// Quoting style; affects how the consumer interprets plain vs quoted text
    /// (e.g. a plain empty scalar is null-like, a quoted one is a string).
    pub style: ScalarStyle,
    /// Optional tag text (e.g. `!!binary`), if the node carried one.
    pub tag: Option<String>,
}

/// One step of the token stream: a [`TokenKind`] with its optional
/// [`Payload`] and the source location it was produced at.
///
/// Tokens are immutable once produced. Replay clones and re-emits them
/// verbatim, so a consumer cannot distinguish a replayed token from a live
/// one.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub payload: Option<Payload>,
    pub location: Location,
}

impl Token {
    /// Structural token (no payload) at the given location.
    pub(crate) fn structural(kind: TokenKind, location: Location) -> Self {
        Self {
            kind,
            payload: None,
            location,
        }
    }

    /// Scalar token with its reconstruction payload.
    pub(crate) fn scalar(payload: Payload, location: Location) -> Self {
        Self {
            kind: TokenKind::Scalar,
            payload: Some(payload),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_delta_matches_open_close() {
        let expected = [
            (TokenKind::SeqStart, true, false, 1),
            (TokenKind::SeqEnd, false, true, -1),
            (TokenKind::MapStart, true, false, 1),
            (TokenKind::MapEnd, false, true, -1),
            (TokenKind::Scalar, false, false, 0),
        ];
        for (kind, open, close, delta) in expected {
            assert_eq!(kind.is_open(), open, "{kind:?}");
            assert_eq!(kind.is_close(), close, "{kind:?}");
            assert_eq!(kind.depth_delta(), delta, "{kind:?}");
        }
    }
}
