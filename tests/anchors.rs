//! End-to-end anchor/alias behavior through `EventStream`, checked by
//! materializing the token stream into a small value tree. A consumer cannot
//! tell replayed tokens from live ones, so a replayed subtree must
//! materialize to a value structurally equal to the live one.

use indoc::indoc;
use saphyr_parser::ScalarStyle;
use saphyr_replay::{AliasLimits, Error, EventStream, Events, Token, TokenKind};

/// Minimal YAML value tree for structural-equality checks in tests.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Null,
    Str(String),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

fn next_token(events: &mut EventStream<'_>) -> Result<Token, Error> {
    Ok(events.next()?.expect("unexpected end of stream"))
}

/// Materialize the next node from the stream.
fn materialize(events: &mut EventStream<'_>) -> Result<Value, Error> {
    let token = next_token(events)?;
    value_from(events, token)
}

fn value_from(events: &mut EventStream<'_>, token: Token) -> Result<Value, Error> {
    Ok(match token.kind {
        TokenKind::Scalar => {
            let payload = token.payload.expect("scalar tokens carry a payload");
            if payload.style == ScalarStyle::Plain
                && matches!(payload.value.as_str(), "" | "~" | "null" | "Null" | "NULL")
            {
                Value::Null
            } else {
                Value::Str(payload.value)
            }
        }
        TokenKind::SeqStart => {
            let mut items = Vec::new();
            loop {
                let token = next_token(events)?;
                if token.kind == TokenKind::SeqEnd {
                    break;
                }
                items.push(value_from(events, token)?);
            }
            Value::Seq(items)
        }
        TokenKind::MapStart => {
            let mut entries = Vec::new();
            loop {
                let token = next_token(events)?;
                if token.kind == TokenKind::MapEnd {
                    break;
                }
                let key = value_from(events, token)?;
                let value = materialize(events)?;
                entries.push((key, value));
            }
            Value::Map(entries)
        }
        TokenKind::SeqEnd | TokenKind::MapEnd => panic!("container end with no start"),
    })
}

/// Parse a single-document YAML string into a `Value`.
fn parse(y: &str) -> Value {
    let mut events = EventStream::new(y, AliasLimits::default());
    let value = materialize(&mut events).expect("valid YAML");
    assert!(
        events.next().expect("stream error").is_none(),
        "trailing tokens after the document"
    );
    value
}

/// Pump the whole stream, returning the first error if any.
fn pump(y: &str, limits: AliasLimits) -> Result<Vec<Value>, Error> {
    let mut events = EventStream::new(y, limits);
    let mut values = Vec::new();
    while events.peek()?.is_some() {
        let token = next_token(&mut events)?;
        values.push(value_from(&mut events, token)?);
    }
    Ok(values)
}

fn get<'v>(value: &'v Value, key: &str) -> &'v Value {
    match value {
        Value::Map(entries) => entries
            .iter()
            .find(|(k, _)| *k == Value::Str(key.to_string()))
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("no key `{key}` in {value:?}")),
        other => panic!("expected a mapping, got {other:?}"),
    }
}

#[test]
fn scalar_anchor_and_alias_materialize_equal() {
    let doc = parse(indoc! {r#"
        a: &x "hi"
        b: *x
    "#});
    assert_eq!(get(&doc, "a"), &Value::Str("hi".into()));
    assert_eq!(get(&doc, "a"), get(&doc, "b"));
}

#[test]
fn mapping_anchor_aliased_twice() {
    let doc = parse(indoc! {"
        base: &n {a: 1, b: 2}
        one: *n
        two: *n
    "});
    let base = get(&doc, "base");
    assert_eq!(
        base,
        &Value::Map(vec![
            (Value::Str("a".into()), Value::Str("1".into())),
            (Value::Str("b".into()), Value::Str("2".into())),
        ])
    );
    assert_eq!(base, get(&doc, "one"));
    assert_eq!(base, get(&doc, "two"));
}

#[test]
fn chained_aliases_resolve_through_each_other() {
    // r1 contains an alias to r0; aliasing r1 later must replay r0's
    // content too.
    let doc = parse(indoc! {"
        r0: &r0 base
        r1: &r1
          child: *r0
        r2:
          list: [*r0, *r1]
    "});
    let r0 = get(&doc, "r0");
    let r1 = get(&doc, "r1");
    let list = get(get(&doc, "r2"), "list");
    assert_eq!(list, &Value::Seq(vec![r0.clone(), r1.clone()]));
    assert_eq!(get(r1, "child"), r0);
}

#[test]
fn aliasing_a_nested_anchor_yields_only_its_subtree() {
    let doc = parse(indoc! {"
        root: &root
          c1: &c1
            c2: &c2 leaf
          other: x
        later: *c1
    "});
    let c1 = get(get(&doc, "root"), "c1");
    assert_eq!(get(&doc, "later"), c1);
    assert_eq!(get(c1, "c2"), &Value::Str("leaf".into()));
    // Not the whole root subtree: `other` belongs to root, not c1.
    assert!(matches!(c1, Value::Map(entries) if entries.len() == 1));
}

#[test]
fn overriding_an_anchor_rebinds_later_aliases() {
    let doc = parse(indoc! {"
        a: &dup first
        b: &dup second
        c: *dup
    "});
    assert_eq!(get(&doc, "c"), &Value::Str("second".into()));
}

#[test]
fn anchored_null_replays_as_null() {
    let doc = parse(indoc! {"
        a: &n null
        b: *n
    "});
    assert_eq!(get(&doc, "a"), &Value::Null);
    assert_eq!(get(&doc, "b"), &Value::Null);
}

#[test]
fn aliases_in_flow_sequence() {
    let doc = parse("[&a hi, *a, *a]");
    assert_eq!(
        doc,
        Value::Seq(vec![
            Value::Str("hi".into()),
            Value::Str("hi".into()),
            Value::Str("hi".into()),
        ])
    );
}

#[test]
fn replayed_values_are_independent_copies() {
    let doc = parse(indoc! {"
        - &A [1, 2, 3]
        - *A
    "});
    let Value::Seq(mut items) = doc else {
        panic!("expected a sequence");
    };
    assert_eq!(items[0], items[1]);

    // Mutating one materialization leaves the other unchanged.
    if let Value::Seq(first) = &mut items[0] {
        first[0] = Value::Str("999".into());
    }
    assert_ne!(items[0], items[1]);
    assert_eq!(
        items[1],
        Value::Seq(vec![
            Value::Str("1".into()),
            Value::Str("2".into()),
            Value::Str("3".into()),
        ])
    );
}

#[test]
fn dangling_alias_fails_the_parse() {
    // The scanner itself rejects an alias whose name was never anchored, so
    // this surfaces as a scan error with a location, before any value for
    // the alias position is produced.
    let err = pump("a: *ghost\n", AliasLimits::default()).expect_err("dangling alias must fail");
    assert!(matches!(err, Error::Message { .. }), "got {err:?}");
    assert!(err.location().is_some());
}

#[test]
fn anchors_do_not_leak_across_documents() {
    // The scanner resolves the alias name globally, but each document gets a
    // fresh tracker, so the capture is gone: an unresolved-anchor error.
    let y = "name: &a John\n---\nname: *a\n";
    let err = pump(y, AliasLimits::default()).expect_err("cross-document alias must fail");
    assert!(matches!(err, Error::UnresolvedAnchor { .. }), "got {err:?}");
}

#[test]
fn alias_inside_its_own_anchor_is_rejected() {
    let err = pump("&a [x, *a]\n", AliasLimits::default())
        .expect_err("self-referential alias must fail");
    assert!(matches!(err, Error::Message { .. }), "got {err:?}");
    assert!(
        err.to_string().contains("inside its own subtree"),
        "got {err}"
    );
}

#[test]
fn peek_matches_next() {
    let mut events = EventStream::new("a: &x 1\nb: *x\n", AliasLimits::default());
    loop {
        let peeked = events.peek().expect("stream error");
        let next = events.next().expect("stream error");
        match (peeked, next) {
            (None, None) => break,
            (Some(p), Some(n)) => {
                assert_eq!(p.kind, n.kind);
                assert_eq!(p.location, n.location);
            }
            (p, n) => panic!("peek {p:?} disagrees with next {n:?}"),
        }
    }
}
