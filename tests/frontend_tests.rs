// tests/frontend_tests.rs
//! Integration tests for the Marlin frontend
//!
//! These tests run complete programs through tokenizer, parser, module merge
//! and both resolver passes, with the standard library in `test_scripts/std`.


use marlin::{Frontend, FrontendConfig, FrontendError, SourceFile};
use marlin_core::{MessageId, ResultCode};
use marlin_parser::ast::{FileId, Member, Parser, Statement, TypeDefinition};
use marlin_parser::{TokenKind, tokenize};
use std::fs;
use tempdir::TempDir;
use test_harness::{AnalysisExt, TestHarness};

const SCENARIO_ONE: &str =
    "module app; public class Program { public static void Main() { std::Int32 number = 1; } }";

#[test]
fn test_scenario_one_parses_a_single_class() {
    let parsed = Parser::parse_source(SCENARIO_ONE, "main.mn", FileId(0));
    assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);

    let unit = parsed.unit.expect("a compilation unit");
    assert_eq!(unit.module_name, "app");
    assert_eq!(unit.types.len(), 1);

    let TypeDefinition::Class(class) = &unit.types[0] else {
        panic!("expected a class");
    };
    assert_eq!(class.name, "Program");
    assert_eq!(class.members.len(), 1);

    let Member::Method(main) = &class.members[0] else {
        panic!("expected a method");
    };
    assert_eq!(main.name, "Main");
    assert!(main.is_static);
    assert_eq!(main.body.statements.len(), 1);
    assert!(matches!(main.body.statements[0], Statement::LocalVariable(_)));
}

#[test]
fn test_scenario_one_resolves_cleanly() {
    let harness = TestHarness::new();
    let analysis = harness.analyze_sources(&[("main.mn", SCENARIO_ONE)]);
    analysis.assert_clean();
}

#[test]
fn test_scenario_two_repeated_modifier() {
    let source = "module app; public class A { public public void m(){} }";
    let parsed = Parser::parse_source(source, "a.mn", FileId(0));
    assert_eq!(parsed.diagnostics.count_of(MessageId::RepeatedModifier), 1);
    assert_eq!(parsed.diagnostics.len(), 1, "{}", parsed.diagnostics);

    let unit = parsed.unit.expect("a compilation unit");
    let members = unit.types[0].members();
    assert_eq!(members.len(), 1);
    assert!(matches!(&members[0], Member::Method(m) if m.name == "m"));
}

#[test]
fn test_scenario_three_argument_count_mismatch() {
    let harness = TestHarness::new();
    let source = "module app; using std;
        public class Program {
            public void Three(Int32 a, Int32 b, Int32 c) { }
            public void Run() { Three(1, 2); Int32 x = 1; Three(x, x, x); }
        }";
    let analysis = harness.analyze_sources(&[("main.mn", source)]);
    analysis.assert_counts(&[(MessageId::ArgumentCountMismatch, 1)]);

    let unit = analysis.unit("app").unwrap();
    let Member::Method(run) = &unit.types[0].members()[1] else {
        panic!("expected a method");
    };
    let Statement::Expression(call) = &run.body.statements[0] else {
        panic!("expected a call");
    };
    assert!(analysis.bindings.type_of(call.id).is_some());
}

#[test]
fn test_scenario_four_uninitialized_reads() {
    let harness = TestHarness::new();
    let source = "module app; using std;
        public class Program {
            public static void Main() {
                Int32 x;
                Console.WriteLine(x);
                Int32 y = x;
                x = 2;
                Console.WriteLine(x);
            }
        }";
    let analysis = harness.analyze_sources(&[("main.mn", source)]);
    analysis.assert_counts(&[(MessageId::UninitializedVariableUsage, 2)]);
}

#[test]
fn test_arrow_is_one_token() {
    let stream = tokenize("a->b", "a.mn");
    assert_eq!(
        stream.kinds(),
        vec![TokenKind::Identifier, TokenKind::Arrow, TokenKind::Identifier]
    );
}

#[test]
fn test_reparse_is_structurally_equal() {
    let first = Parser::parse_source(SCENARIO_ONE, "main.mn", FileId(4));
    let second = Parser::parse_source(SCENARIO_ONE, "main.mn", FileId(4));
    assert_eq!(first.unit, second.unit);
}

#[test]
fn test_hello_program() {
    let harness = TestHarness::new();
    let analysis = harness.analyze_program("hello");
    analysis.assert_clean();

    // Both files of module `app` end up in one unit.
    let app = analysis.unit("app").unwrap();
    let mut names: Vec<_> = app.types.iter().map(|t| t.name()).collect();
    names.sort();
    assert_eq!(names, ["Greeter", "Program"]);
}

#[test]
fn test_shapes_program_uses_nested_modules() {
    let harness = TestHarness::new();
    let analysis = harness.analyze_program("shapes");
    analysis.assert_clean();
    assert!(analysis.unit("app::geometry").is_some());
}

#[test]
fn test_broken_program() {
    let harness = TestHarness::new();
    let analysis = harness.analyze_program("broken");
    analysis.assert_counts(&[
        (MessageId::ArgumentCountMismatch, 1),
        (MessageId::UninitializedVariableUsage, 2),
    ]);
    assert_eq!(analysis.result_code(), ResultCode::Failure);
    assert_eq!(analysis.result_code().exit_code(), 2);
}

#[test]
fn test_forward_references_ignore_file_order() {
    let harness = TestHarness::new();
    let user = "module app; using lib;
        public class User { public Account Primary; public Account Open() { return new Account(); } }";
    let account = "module lib; using app;
        public class Account { public User? Owner; }";

    let forward = harness.analyze_sources(&[("user.mn", user), ("account.mn", account)]);
    let backward = harness.analyze_sources(&[("account.mn", account), ("user.mn", user)]);
    forward.assert_clean();
    backward.assert_clean();
}

#[test]
fn test_duplicate_types_across_files() {
    let harness = TestHarness::new();
    let analysis = harness.analyze_sources(&[
        ("a.mn", "module app; public class Thing { }"),
        ("b.mn", "module app; public class Thing { }"),
    ]);
    analysis.assert_counts(&[(MessageId::SymbolAlreadyDefined, 1)]);
}

#[test]
fn test_directory_run() {
    let dir = TempDir::new("marlin-frontend").unwrap();
    let nested = dir.path().join("app").join("core");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        dir.path().join("main.mn"),
        "module app; using std; using app::core;
         public class Program { public static void Main() { Counter c = new Counter(); c.Bump(); } }",
    )
    .unwrap();
    fs::write(
        nested.join("counter.mn"),
        "module app::core; using std;
         public class Counter { public Int32 Value; public void Bump() { Value = Value + 1; } }",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not marlin at all: #$%").unwrap();

    let harness = TestHarness::new();
    let analysis = harness.frontend().analyze_directory(dir.path()).unwrap();
    analysis.assert_clean();
    assert!(analysis.unit("app::core").is_some());
}

#[test]
fn test_directory_run_reports_per_file() {
    let dir = TempDir::new("marlin-frontend").unwrap();
    fs::write(dir.path().join("a.mn"), "module a; class A { }").unwrap();
    fs::write(dir.path().join("b.mn"), "module b; public class B { # }").unwrap();

    let analysis = TestHarness::new()
        .frontend()
        .analyze_directory(dir.path())
        .unwrap();
    analysis.assert_counts(&[
        (MessageId::AlwaysSpecifyTypeVisibility, 1),
        (MessageId::InvalidCharacter, 1),
    ]);
    let files: Vec<_> = analysis
        .diagnostics
        .iter()
        .map(|d| d.location.as_ref().unwrap().file().to_string())
        .collect();
    assert!(files[0].ends_with("a.mn"));
    assert!(files[1].ends_with("b.mn"));
}

#[test]
fn test_missing_standard_library() {
    let dir = TempDir::new("marlin-frontend").unwrap();
    let missing = dir.path().join("no-such-stdlib");
    let frontend = Frontend::new(FrontendConfig::new().with_stdlib(&missing));

    let error = frontend
        .analyze_sources(vec![SourceFile::new("main.mn", SCENARIO_ONE)])
        .unwrap_err();
    assert!(matches!(error, FrontendError::MissingStandardLibrary { ref path } if *path == missing));
    assert_eq!(error.exit_code(), 3);
}

#[test]
fn test_unreadable_input_is_an_io_error() {
    let dir = TempDir::new("marlin-frontend").unwrap();
    let error = TestHarness::new()
        .frontend()
        .analyze_directory(dir.path().join("missing-dir"))
        .unwrap_err();
    assert!(matches!(error, FrontendError::Io { .. }));
}
