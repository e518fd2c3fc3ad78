use insta::assert_snapshot;
use sequence_lint::create_default_engine;
use sequence_lint::diagnostics::Diagnostic;

fn format_diags(diags: &[Diagnostic]) -> String {
    let mut lines: Vec<String> = diags
        .iter()
        .map(|d| {
            format!(
                "{}:{}:{}: {}: {}",
                d.lint.name,
                d.span.start.row,
                d.span.start.column,
                d.level.as_str(),
                d.message
            )
        })
        .collect();
    lines.sort();
    lines.join("\n")
}

fn lint_fixture(src: &str) -> String {
    let engine = create_default_engine().expect("default engine");
    let diags = engine.lint_source(src).expect("linting should succeed");
    format_diags(&diags)
}

#[test]
fn ordered_imports_positive() {
    let out = lint_fixture(include_str!("fixtures/ordered_imports/positive.ts"));
    assert_snapshot!(out, @r###"
    ordered_import_members:1:13: warning: Sort import members alphabetically. "a" should come before "b".
    ordered_imports_by_path:2:1: warning: Sort imports alphabetically by path. `./alpha` should come before `./zeta`
    "###);
}

#[test]
fn ordered_imports_negative() {
    let out = lint_fixture(include_str!("fixtures/ordered_imports/negative.ts"));
    assert_snapshot!(out, @r###""###);
}

#[test]
fn strict_camel_case_positive() {
    let out = lint_fixture(include_str!("fixtures/strict_camel_case/positive.ts"));
    assert_snapshot!(out, @r###"
    strict_camel_case:1:23: warning: Identifier "rawHTML" is not in strict camel case, should be "rawHtml".
    strict_camel_case:1:35: warning: Identifier "rawHTML" is not in strict camel case, should be "rawHtml".
    strict_camel_case:1:7: warning: Identifier "parseXMLData" is not in strict camel case, should be "parseXmlData".
    strict_camel_case:2:7: warning: Identifier "userURL" is not in strict camel case, should be "userUrl".
    strict_camel_case:3:5: warning: Identifier "getX" is not in strict camel case, no suggestion possible for 1-char words.
    "###);
}

#[test]
fn strict_camel_case_negative() {
    let out = lint_fixture(include_str!("fixtures/strict_camel_case/negative.ts"));
    assert_snapshot!(out, @r###""###);
}

#[test]
fn logical_expression_complexity_positive() {
    let out = lint_fixture(include_str!(
        "fixtures/logical_expression_complexity/positive.ts"
    ));
    assert_snapshot!(out, @r###"
    logical_expression_complexity:2:10: warning: Expression has 5 terms; max allowed is 4
    logical_expression_complexity:2:10: warning: Expression height is 3; max allowed is 2
    "###);
}

#[test]
fn logical_expression_complexity_negative() {
    let out = lint_fixture(include_str!(
        "fixtures/logical_expression_complexity/negative.ts"
    ));
    assert_snapshot!(out, @r###""###);
}

#[test]
fn ordered_destructuring_positive() {
    let out = lint_fixture(include_str!("fixtures/ordered_destructuring/positive.ts"));
    assert_snapshot!(out, @r###"
    ordered_destructuring:1:7: warning: alpha should come before zeta
    ordered_destructuring:2:15: warning: height should come before width
    "###);
}

#[test]
fn ordered_destructuring_negative_stops_at_string_keys() {
    let out = lint_fixture(include_str!("fixtures/ordered_destructuring/negative.ts"));
    assert_snapshot!(out, @r###""###);
}
