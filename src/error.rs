//! Defines error and its location
use std::fmt;

use saphyr_parser::{ScanError, Span};

/// Row/column location within the source YAML document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) row: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `row`: 1-indexed row.
    /// - `column`: 1-indexed column.
    pub(crate) const fn new(row: usize, column: usize) -> Self {
        // 4 Gb is larger than any YAML document I can imagine, and also this is
        // error reporting only.
        Self {
            row: row as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line number, 0 if unknown.
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// 1-indexed column number, 0 if unknown.
    pub fn column(&self) -> u64 {
        self.column as u64
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed `Location`.
///
/// Called by:
/// - The event stream for each raw parser event.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

/// Error produced by the tracker or the event stream.
#[derive(Debug)]
pub enum Error {
    /// Free-form error with optional source location. Also covers scan errors
    /// from the underlying parser and alias replay limit breaches.
    Message { msg: String, location: Location },
    /// An alias references an anchor that was never declared in this parse
    /// pass. This is a structural document error (dangling alias), not an
    /// internal fault.
    UnresolvedAnchor { name: String, location: Location },
    /// A container-close token would make the nesting depth negative. The
    /// upstream tokenizer guarantees well-nested streams, so this indicates
    /// an internal-consistency violation rather than a malformed document.
    DepthUnderflow { location: Location },
}

impl Error {
    /// Construct a `Message` error with no known location.
    ///
    /// Arguments:
    /// - `s`: human-readable message.
    pub(crate) fn msg<S: Into<String>>(s: S) -> Self {
        Error::Message {
            msg: s.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct an `UnresolvedAnchor` error for the given anchor name
    /// (unknown location).
    ///
    /// Called by:
    /// - `AnchorTracker::lookup` when the name has no registry entry.
    pub(crate) fn unresolved_anchor<S: Into<String>>(name: S) -> Self {
        Error::UnresolvedAnchor {
            name: name.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Construct a `DepthUnderflow` error with unknown location.
    pub(crate) fn depth_underflow() -> Self {
        Error::DepthUnderflow {
            location: Location::UNKNOWN,
        }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Arguments:
    /// - `set_location`: location to store in the error.
    ///
    /// Called by:
    /// - Most error paths once the token position becomes known.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Message { location, .. }
            | Error::UnresolvedAnchor { location, .. }
            | Error::DepthUnderflow { location } => {
                *location = set_location;
            }
        }
        self
    }

    /// If the error has a known location, return it.
    ///
    /// Returns:
    /// - `Some(Location)` when coordinates are known; `None` otherwise.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Message { location, .. }
            | Error::UnresolvedAnchor { location, .. }
            | Error::DepthUnderflow { location } => {
                if location != &Location::UNKNOWN {
                    Some(*location)
                } else {
                    None
                }
            }
        }
    }

    /// Map a `saphyr_parser::ScanError` into our error type with location.
    ///
    /// Called by:
    /// - The event stream when the underlying parser fails.
    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let mark = err.marker();
        let location = Location::new(mark.line(), mark.col() + 1);
        Error::Message {
            msg: err.info().to_owned(),
            location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, location } => fmt_with_location(f, msg, location),
            Error::UnresolvedAnchor { name, location } => fmt_with_location(
                f,
                &format!("alias references unresolved anchor `{name}`"),
                location,
            ),
            Error::DepthUnderflow { location } => {
                fmt_with_location(f, "internal depth underflow", location)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location != &Location::UNKNOWN {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.row, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}
