//! End-to-end dispatch behaviour.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use pathwarden::routing::compiler::compile;
use pathwarden::routing::{
    OptionSet, Resolver, RouteEntry, RouteOptions, RouteTable, RouteValue, Router, WILDCARD,
};
use pathwarden::RouteError;

mod common;
use common::{segs, Recorder};

#[test]
fn test_literal_patterns_match_themselves() {
    let router = Router::new();
    let patterns = ["hello", "hello/world", "a/b/c/d", "with-dash/and_underscore", "dots.in/names"];
    let table: RouteTable = patterns.iter().map(|p| RouteEntry::literal(*p)).collect();

    for pattern in patterns {
        let padded = format!("/{pattern}/");
        let matched = router.run_table(&padded, &table, None).unwrap().unwrap();
        assert_eq!(matched.pattern, pattern);
        assert_eq!(matched.segments, pattern.split('/').collect::<Vec<_>>());
    }
}

#[test]
fn test_int_modifier() {
    let router = Router::new();
    let table = RouteTable::new().route("a/:int");

    let matched = router.run_table("a/-42", &table, None).unwrap().unwrap();
    assert_eq!(matched.segments, segs(&["a", "-42"]));
    let matched = router.run_table("a/42", &table, None).unwrap().unwrap();
    assert_eq!(matched.segments, segs(&["a", "42"]));
    assert!(router.run_table("a/4.2", &table, None).unwrap().is_none());
}

#[test]
fn test_other_builtins() {
    let router = Router::new();
    let cases = [
        ("f/:float", "f/-1.5", true),
        ("f/:float", "f/1", false),
        ("d/:digit", "d/007", true),
        ("d/:digit", "d/-7", false),
        ("n/:num", "n/123", true),
        ("h/:hex", "h/0xFF", true),
        ("h/:hex", "h/ff", true),
        ("h/:hex", "h/fg", false),
        ("b/:bin", "b/1010", true),
        ("b/:bin", "b/102", false),
        ("any/:any", "any/x.y-z", true),
        ("any/:any", "any/x/y", false),
    ];

    for (pattern, path, expected) in cases {
        let table = RouteTable::new().route(pattern);
        let matched = router.run_table(path, &table, None).unwrap();
        assert_eq!(matched.is_some(), expected, "{pattern} against {path}");
    }
}

#[test]
fn test_hex_is_case_sensitive_when_asked() {
    let router = Router::new();
    let table = RouteTable::new().configured("h/:hex", RouteOptions::new().case_sensitive(true));
    assert!(router.run_table("h/FF", &table, None).unwrap().is_some());
    assert!(router.run_table("h/ff", &table, None).unwrap().is_none());
}

#[test]
fn test_inline_regex() {
    let router = Router::new();
    let table = RouteTable::new().route("a/:@b|c@");

    assert!(router.run_table("a/b", &table, None).unwrap().is_some());
    assert!(router.run_table("a/c", &table, None).unwrap().is_some());
    assert!(router.run_table("a/d", &table, None).unwrap().is_none());
}

#[test]
fn test_escaped_modifier_is_literal() {
    let router = Router::new();
    let table = RouteTable::new().route(r"a/\:int");
    assert!(router.run_table("a/:int", &table, None).unwrap().is_some());
    assert!(router.run_table("a/5", &table, None).unwrap().is_none());
}

#[test]
fn test_first_match_wins() {
    let router = Router::new();
    let recorder = Recorder::new();
    let table = RouteTable::new()
        .configured("a/:int", RouteOptions::new().with_handler(recorder.handler("p1")))
        .configured("a/:any", RouteOptions::new().with_handler(recorder.handler("p2")));

    let matched = router.run_table("a/1", &table, None).unwrap().unwrap();
    assert_eq!(matched.pattern, "a/:int");
    assert!(matched.handled);
    assert_eq!(recorder.labels(), vec!["p1"]);
}

#[test]
fn test_entries_after_match_are_never_compiled() {
    let router = Router::new();
    let table = RouteTable::new().route("a").route(":@(@");
    assert!(router.run_table("a", &table, None).unwrap().is_some());
    assert!(matches!(
        router.run_table("b", &table, None),
        Err(RouteError::InvalidExpression { .. })
    ));
}

#[test]
fn test_fallback_handler() {
    let router = Router::new();
    let recorder = Recorder::new();
    let fallback = recorder.handler("fallback");
    let table = RouteTable::new()
        .route("plain")
        .handle("own", {
            let own = recorder.handler("own");
            move |segments: &[String]| own(segments)
        });

    router.run_table("plain", &table, Some(&fallback)).unwrap();
    router.run_table("own", &table, Some(&fallback)).unwrap();
    assert_eq!(recorder.labels(), vec!["fallback", "own"]);
}

#[test]
fn test_reset_group_between_patterns() {
    let router = Router::new();
    let table = RouteTable::new()
        .group(RouteOptions::new().case_sensitive(true).regex(false))
        .route("first/:@x|y@")
        .group(RouteOptions::new().reset())
        .route("second/:@x|y@");

    // accumulated options: case sensitive, no inline regex
    assert!(router.run_table("first/:@x|y@", &table, None).unwrap().is_some());
    assert!(router.run_table("FIRST/:@x|y@", &table, None).unwrap().is_none());
    assert!(router.run_table("first/x", &table, None).unwrap().is_none());

    // base options again
    assert!(router.run_table("SECOND/x", &table, None).unwrap().is_some());
}

#[test]
fn test_group_handler_is_inherited() {
    let router = Router::new();
    let recorder = Recorder::new();
    let table = RouteTable::new()
        .group(RouteOptions::new().with_handler(recorder.handler("group")))
        .route("a")
        .group(RouteOptions::new().reset())
        .route("b");

    router.run_table("a", &table, None).unwrap();
    let unhandled = router.run_table("b", &table, None).unwrap().unwrap();
    assert!(!unhandled.handled);
    assert_eq!(recorder.labels(), vec!["group"]);
}

#[test]
fn test_named_group_equals_inline_options() {
    let base = OptionSet::default();
    let corpus = ["x/1", "X/1", "x/a", "", "x", "x/1/2"];

    for case_sensitive in [false, true] {
        let via_group = RouteTable::new()
            .group(RouteOptions::new().name("g").case_sensitive(case_sensitive))
            .group(RouteOptions::new().reset())
            .configured("x/:int", RouteOptions::new().use_group("g"));
        let inline = RouteTable::new()
            .configured("x/:int", RouteOptions::new().case_sensitive(case_sensitive));

        for path in corpus {
            let grouped = compile_last(&base, &via_group, path);
            let inlined = compile_last(&base, &inline, path);
            assert_eq!(grouped.expression(), inlined.expression());
            assert_eq!(grouped.is_match(path), inlined.is_match(path), "{path}");
        }
    }
}

#[test]
fn test_named_group_keeps_scope_changed_after_declaration() {
    let base = OptionSet::default();
    let corpus = ["x/a", "X/a", "x/b", "x/:@a|b@", "X/:@A|B@", "x/c"];

    let via_group = RouteTable::new()
        .group(RouteOptions::new().name("g").case_sensitive(true))
        .group(RouteOptions::new().regex(false))
        .configured("x/:@a|b@", RouteOptions::new().use_group("g"));
    let inline = RouteTable::new()
        .group(RouteOptions::new().name("g").case_sensitive(true))
        .group(RouteOptions::new().regex(false))
        .configured("x/:@a|b@", RouteOptions::new().case_sensitive(true));

    for path in corpus {
        let grouped = compile_last(&base, &via_group, path);
        let inlined = compile_last(&base, &inline, path);
        assert_eq!(grouped.expression(), inlined.expression());
        assert_eq!(grouped.is_match(path), inlined.is_match(path), "{path}");
    }

    // regex stays off, so the segment is a literal
    let router = Router::new();
    assert!(router.run_table("x/a", &via_group, None).unwrap().is_none());
    assert!(router.run_table("x/:@a|b@", &via_group, None).unwrap().is_some());
    assert!(router.run_table("X/:@a|b@", &via_group, None).unwrap().is_none());
}

fn compile_last(
    base: &OptionSet,
    table: &RouteTable,
    path: &str,
) -> pathwarden::routing::CompiledPattern {
    let mut resolver = Resolver::new(base, HashMap::new());
    let mut last = None;
    for entry in table {
        if let Some((pattern, options)) = resolver.resolve(entry) {
            last = Some(compile(pattern, &options, path).unwrap());
        }
    }
    last.unwrap()
}

#[test]
fn test_wildcard_catch_all() {
    let router = Router::new();
    let recorder = Recorder::new();
    let table = RouteTable::new()
        .route("known")
        .configured(WILDCARD, RouteOptions::new().with_handler(recorder.handler("catch-all")));

    for path in ["", "/", "unknown", "deep/er/path", "known/not"] {
        let matched = router.run_table(path, &table, None).unwrap();
        assert!(matched.is_some(), "{path:?}");
    }
    assert_eq!(recorder.calls().len(), 5);
    assert_eq!(recorder.last().unwrap().1, segs(&["known/not"]));
}

#[test]
fn test_wildcard_suffix() {
    let router = Router::new();
    let table = RouteTable::new().route("files/:*/ignored");
    let matched = router.run_table("files/a/b/c", &table, None).unwrap().unwrap();
    assert_eq!(matched.segments, segs(&["files", "a/b/c"]));
}

#[test]
fn test_empty_pattern_matches_empty_path() {
    let router = Router::new();
    let table = RouteTable::new().route("");
    assert!(router.run_table("/", &table, None).unwrap().is_some());
    assert!(router.run_table("a", &table, None).unwrap().is_none());
}

#[test]
fn test_user_modifier_failure_moves_on() {
    let router = Router::new();
    router.register_modifier("even", |s: &str| {
        s.parse::<i64>().map(|n| n % 2 == 0).unwrap_or(false)
    });
    let recorder = Recorder::new();
    let table = RouteTable::new()
        .configured("n/::even", RouteOptions::new().with_handler(recorder.handler("even")))
        .configured("n/:int", RouteOptions::new().with_handler(recorder.handler("odd")));

    router.run_table("n/4", &table, None).unwrap();
    router.run_table("n/7", &table, None).unwrap();
    assert_eq!(recorder.labels(), vec!["even", "odd"]);
    assert_eq!(recorder.calls()[0].1, segs(&["n", "4"]));
}

#[test]
fn test_user_modifiers_can_be_disabled() {
    let router = Router::new();
    router.register_modifier("any", |_: &str| true);
    let table = RouteTable::new().configured("u/::any", RouteOptions::new().user_modifiers(false));
    assert!(router.run_table("u/x", &table, None).unwrap().is_none());
    assert!(router.run_table("u/::any", &table, None).unwrap().is_some());
}

#[test]
fn test_compilation_is_deterministic() {
    let options = pathwarden::routing::EffectiveOptions::from_options(&OptionSet::default());
    let corpus = ["a/1", "a/-1", "a/x", "A/1", "a", "", "a/1/2", "b/1"];
    for pattern in ["a/:int", "a/:@[0-9x]+@", ":*", "a/:any", "a"] {
        let first = compile(pattern, &options, "").unwrap();
        let second = compile(pattern, &options, "").unwrap();
        assert_eq!(first.expression(), second.expression());
        for path in corpus {
            assert_eq!(first.is_match(path), second.is_match(path));
        }
    }
}

#[test]
fn test_option_group_example_table() {
    let router = Router::new();
    let recorder = Recorder::new();
    let fallback = recorder.handler("default");
    let table = RouteTable::new()
        .group(RouteOptions::new().name("simple").case_sensitive(false).regex(false))
        .route("no/:@regex@")
        .group(RouteOptions::new().reset())
        .route("yay/:@regex@")
        .configured(
            "temp/:int",
            RouteOptions::new().reset().with_handler(recorder.handler("temp")),
        )
        .configured("named/groups/:@a|b@", RouteOptions::new().use_group("simple"))
        .handle("basic", {
            let basic = recorder.handler("basic");
            move |segments: &[String]| basic(segments)
        })
        .configured(WILDCARD, RouteOptions::new().with_handler(recorder.handler("none")));

    let expectations = [
        ("no/:@regex@", "default", vec!["no", ":@regex@"]),
        ("yay/regex", "default", vec!["yay", "regex"]),
        ("temp/-132", "temp", vec!["temp", "-132"]),
        ("named/groups/:@a|b@", "default", vec!["named", "groups", ":@a|b@"]),
        ("named/groups/a", "none", vec!["named/groups/a"]),
        ("basic", "basic", vec!["basic"]),
        ("thiswontmatch/any/route", "none", vec!["thiswontmatch/any/route"]),
    ];

    for (path, label, segments) in expectations {
        recorder.clear();
        router.run_table(path, &table, Some(&fallback)).unwrap();
        assert_eq!(recorder.calls(), vec![(label.to_string(), segs(&segments))], "{path}");
    }
}

#[test]
fn test_register_overwrites_in_place() {
    let router = Router::new();
    router.register("a/:any", RouteValue::None);
    router.register("a/:int", RouteValue::None);
    router.register("a/:any", RouteOptions::new().case_sensitive(true));

    let table = router.table();
    assert_eq!(table.len(), 2);
    assert_eq!(table.entries()[0].pattern(), Some("a/:any"));
    assert_eq!(router.run("a/1").unwrap().unwrap().pattern, "a/:any");
}

#[test]
fn test_global_router() {
    let recorder = Recorder::new();
    pathwarden::routing::register_modifier("global_slug", |s: &str| {
        s.chars().all(|c| c.is_ascii_lowercase() || c == '-')
    });
    pathwarden::routing::register("global-test/::global_slug", RouteValue::None);

    let fallback = recorder.handler("fallback");
    let matched = pathwarden::routing::run_with("global-test/a-slug", move |s: &[String]| fallback(s))
        .unwrap()
        .unwrap();
    assert_eq!(matched.segments, segs(&["global-test", "a-slug"]));
    assert_eq!(recorder.labels(), vec!["fallback"]);

    assert!(pathwarden::routing::run("global-test/Not_A_Slug").unwrap().is_none());
}

#[test]
fn test_concurrent_runs_are_isolated() {
    let router = Arc::new(Router::new());
    let mut workers = Vec::new();

    for worker in 0..8 {
        let router = router.clone();
        workers.push(thread::spawn(move || {
            let sensitive = worker % 2 == 0;
            let table = RouteTable::new()
                .group(RouteOptions::new().case_sensitive(sensitive))
                .route("Path/:int");
            for _ in 0..200 {
                let matched = router.run_table("path/1", &table, None).unwrap();
                assert_eq!(matched.is_none(), sensitive);
            }
        }));
    }

    for worker in workers {
        worker.join().unwrap();
    }
}
