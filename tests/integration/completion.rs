use proptest::prelude::*;
use scriptify::terminal::{CompletionEngine, Session, SessionConfig};

use crate::common::ScriptedEvaluator;

fn warmed_session() -> Session<ScriptedEvaluator> {
    let mut session = Session::new(ScriptedEvaluator::new(), SessionConfig::default());
    let mut out = Vec::new();
    for line in [
        r"use Acme\Widget;",
        "$obj = new Widget();",
        "$objects = new ArrayObject();",
        "$count = 3;",
    ] {
        session.submit(line, &mut out).unwrap();
    }
    session
}

fn complete(
    session: &Session<ScriptedEvaluator>,
    line: &str,
    partial: &str,
) -> Vec<String> {
    let state = session.state();
    let state = state.borrow();
    CompletionEngine::new().complete(&state, line, line.len(), partial)
}

#[test]
fn test_member_completion_after_execution() {
    let session = warmed_session();
    assert_eq!(complete(&session, "$obj->get", "get"), vec!["getName", "getSize"]);
    assert_eq!(
        complete(&session, "$obj->", ""),
        vec!["getName", "getSize", "name"]
    );
    assert_eq!(complete(&session, "$objects?->", "c"), vec!["count"]);
}

#[test]
fn test_variable_completion_uses_tracked_names() {
    let session = warmed_session();
    assert_eq!(complete(&session, "echo $ob", "ob"), vec!["obj", "objects"]);
    assert_eq!(complete(&session, "$c", "c"), vec!["count"]);
}

#[test]
fn test_global_completion_merges_sources() {
    let session = warmed_session();
    assert_eq!(complete(&session, "new Wid", "Wid"), vec!["Widget"]);
    assert_eq!(complete(&session, "str", "str"), vec!["str_replace", "strlen"]);
    assert_eq!(complete(&session, r"new Acme\W", "W"), vec!["Widget"]);
}

#[test]
fn test_primitive_has_no_members() {
    let session = warmed_session();
    assert!(complete(&session, "$count->", "").is_empty());
}

proptest! {
    #[test]
    fn prop_completion_is_deterministic(line in r"[$a-zA-Z_\\ >-]{0,16}") {
        let session = warmed_session();
        let state = session.state();
        let state = state.borrow();
        let engine = CompletionEngine::new();
        let cursor = line.len();
        let start = scriptify::terminal::line::word_start(&line, cursor);
        let partial = &line[start..];
        let first = engine.complete(&state, &line, cursor, partial);
        let second = engine.complete(&state, &line, cursor, partial);
        prop_assert_eq!(&first, &second);
        let mut sorted = first.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(first, sorted);
    }
}
