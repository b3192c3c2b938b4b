use proptest::prelude::*;
use scriptify::terminal::{Input, LineSource, Phase, Session, SessionConfig, Value};

use crate::common::{ScriptedEvaluator, ScriptedLines};

fn session() -> Session<ScriptedEvaluator> {
    Session::new(ScriptedEvaluator::new(), SessionConfig::default())
}

fn transcript(lines: &[&str]) -> (Session<ScriptedEvaluator>, ScriptedLines, String) {
    let mut session = session();
    let mut source = ScriptedLines::lines(lines);
    let mut out = Vec::new();
    session.run(&mut source, &mut out).unwrap();
    (session, source, String::from_utf8(out).unwrap())
}

#[test]
fn test_multiline_block_runs_once_closed() {
    let (session, source, out) = transcript(&["if (true) {", "echo 1;", "}", "exit"]);
    assert_eq!(out, "1\n");
    assert_eq!(session.evaluator().calls, vec!["if (true) {\necho 1;\n}"]);
    assert_eq!(source.prompts, vec!["php> ", "php* ", "php* ", "php> "]);
}

#[test]
fn test_bare_expression_is_wrapped_and_displayed() {
    let (session, _, out) = transcript(&["$x = 5;", "$x + 1", "quit"]);
    assert_eq!(out, "6\n");
    assert_eq!(session.evaluator().calls[1], "return ($x + 1);");
    let state = session.state();
    assert_eq!(state.borrow().context.get("x"), Some(&Value::int(5)));
}

#[test]
fn test_import_then_instantiate_with_short_name() {
    let (session, _, out) = transcript(&[r"use Acme\Widget;", "$w = new Widget();", "exit"]);
    assert_eq!(out, "");
    assert_eq!(session.evaluator().calls, vec![r"$w = new Acme\Widget();"]);

    let state = session.state();
    let state = state.borrow();
    assert_eq!(state.aliases.get("Widget"), Some(r"Acme\Widget"));
    assert!(state.registry.members("w").is_some());
}

#[test]
fn test_mixed_unit_is_executed_as_written() {
    let (session, _, _) = transcript(&[r"use Acme\Widget; $w = new Widget();", "exit"]);
    assert_eq!(
        session.evaluator().calls,
        vec![r"use Acme\Widget; $w = new Widget();"]
    );
    assert!(session.state().borrow().aliases.is_empty());
}

#[test]
fn test_runtime_failure_is_reported_and_context_survives() {
    let (session, _, out) = transcript(&["$a = 1;", "throw boom;", "$a + 1", "exit"]);
    assert_eq!(out, "Exception: boom\n  in eval()'d code on line 1\n2\n");
    assert_eq!(session.phase(), Phase::Terminated);
}

#[test]
fn test_parse_failure_is_reported() {
    let (_, _, out) = transcript(&["this is not php;", "exit"]);
    assert_eq!(out, "Parse error: syntax error, unexpected 'this is not php'\n");
}

#[test]
fn test_housekeeping_names_are_not_persisted() {
    let (session, _, _) = transcript(&["$n = 3;", "$n + 0", "exit"]);
    let inputs = &session.evaluator().inputs;
    assert!(inputs[1].contains_key("n"));
    assert!(!inputs[1].contains_key("this"));
    assert!(!inputs[1].contains_key("code"));
}

#[test]
fn test_interrupt_discards_pending_unit() {
    let mut session = session();
    let mut source = ScriptedLines::new(vec![
        Input::Line("if (true) {".into()),
        Input::Interrupted,
        Input::Line("echo 2;".into()),
    ]);
    let mut out = Vec::new();
    session.run(&mut source, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "2\n\n");
    assert_eq!(session.evaluator().calls, vec!["echo 2;"]);
    assert_eq!(source.prompts, vec!["php> ", "php* ", "php> ", "php> "]);
}

#[test]
fn test_exit_keyword_inside_open_block() {
    let (session, _, out) = transcript(&["if (true) {", "  exit  "]);
    assert_eq!(out, "");
    assert!(session.evaluator().calls.is_empty());
}

#[test]
fn test_history_holds_non_blank_lines() {
    let (_, source, _) = transcript(&["$a = 1;", "   ", "", "$a + 1"]);
    assert_eq!(source.history(), vec!["$a = 1;", "$a + 1"]);
}

#[test]
fn test_evaluator_exit_ends_session() {
    let (session, _, out) = transcript(&["echo 'bye'; exit();", "$never = 1;"]);
    assert_eq!(out, "bye\nEvaluator process exited\n");
    assert_eq!(session.evaluator().calls.len(), 1);
}

#[test]
fn test_user_function_becomes_completable() {
    let (session, _, _) = transcript(&["function greet() {}", "exit"]);
    let state = session.state();
    assert!(state
        .borrow()
        .symbols
        .functions
        .iter()
        .any(|f| f == "greet"));
}

proptest! {
    #[test]
    fn prop_bindings_round_trip(values in proptest::collection::vec((0usize..4, -1000i64..1000), 1..12)) {
        let names = ["a", "b", "c", "d"];
        let mut session = session();
        let mut expected = std::collections::BTreeMap::new();
        let mut out = Vec::new();
        for (slot, value) in &values {
            let line = format!("${} = {};", names[*slot], value);
            session.submit(&line, &mut out).unwrap();
            expected.insert(names[*slot].to_string(), Value::int(*value));
            let state = session.state();
            let state = state.borrow();
            prop_assert_eq!(state.context.bindings(), &expected);
        }
    }
}
