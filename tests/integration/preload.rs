use std::fs;

use scriptify::terminal::{
    PreloadReport, Preloader, Session, SessionConfig, TerminalError, Value,
};

use crate::common::ScriptedEvaluator;

fn session() -> Session<ScriptedEvaluator> {
    Session::new(ScriptedEvaluator::new(), SessionConfig::default())
}

#[test]
fn test_failing_statement_does_not_stop_preload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preload.php");
    fs::write(
        &path,
        "<?php\n$a = 1;\nthrow boom;\n$b = $a + 1;\n?>\n",
    )
    .unwrap();

    let mut session = session();
    let mut out = Vec::new();
    let report = Preloader::new(&mut session).run(&path, &mut out).unwrap();

    assert_eq!(
        report,
        PreloadReport {
            executed: 2,
            failed: 1,
            imports: 0,
        }
    );
    assert!(!report.success());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Exception: boom\n  in eval()'d code on line 1\n"
    );
    let state = session.state();
    let state = state.borrow();
    assert_eq!(state.context.get("b"), Some(&Value::int(2)));
}

#[test]
fn test_preload_imports_and_blocks() {
    let source = r"<?php
use Acme\Widget;

$w = new Widget();
if (true) {
    echo 'ready';
}
";
    let mut session = session();
    let mut out = Vec::new();
    let report = Preloader::new(&mut session)
        .run_source(source, &mut out)
        .unwrap();

    assert_eq!(report.imports, 1);
    assert_eq!(report.executed, 2);
    assert_eq!(String::from_utf8(out).unwrap(), "ready\n");

    let calls = &session.evaluator().calls;
    assert_eq!(calls[0], r"$w = new Acme\Widget();");
    assert_eq!(calls[1], "if (true) {\n    echo 'ready';\n}");

    let state = session.state();
    assert!(state.borrow().tracker.contains("$w"));
}

#[test]
fn test_preload_never_wraps_expressions() {
    let mut session = session();
    let mut out = Vec::new();
    Preloader::new(&mut session)
        .run_source("$x = 4;\n$x + 1\n", &mut out)
        .unwrap();
    assert_eq!(session.evaluator().calls, vec!["$x = 4;", "$x + 1"]);
    assert_eq!(String::from_utf8(out).unwrap(), "Parse error: syntax error, unexpected '$x + 1'\n");
}

#[test]
fn test_unclosed_tail_is_still_executed() {
    let mut session = session();
    let mut out = Vec::new();
    let report = Preloader::new(&mut session)
        .run_source("$a = 1;\nif (true) {\n$b = 2;\n", &mut out)
        .unwrap();
    assert_eq!(report.executed + report.failed, 2);
    assert_eq!(session.evaluator().calls[1], "if (true) {\n$b = 2;");
}

#[test]
fn test_quotes_do_not_hold_preload_units_open() {
    let mut session = session();
    let mut out = Vec::new();
    let report = Preloader::new(&mut session)
        .run_source("$s = 'it's';\n$n = 1;\n", &mut out)
        .unwrap();
    assert_eq!(session.evaluator().calls.len(), 2);
    assert_eq!(report.executed + report.failed, 2);
}

#[test]
fn test_missing_preload_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.php");
    let mut session = session();
    let result = Preloader::new(&mut session).run(&path, &mut Vec::new());
    assert!(matches!(result, Err(TerminalError::PreloadFileMissing(p)) if p == path));
}

#[test]
fn test_unreadable_preload_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session();
    let result = Preloader::new(&mut session).run(dir.path(), &mut Vec::new());
    assert!(matches!(
        result,
        Err(TerminalError::PreloadFileUnreadable { .. })
    ));
}
