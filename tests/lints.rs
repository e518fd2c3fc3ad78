use sequence_lint::create_default_engine;
use sequence_lint::diagnostics::Diagnostic;
use sequence_lint::parser::Dialect;

fn lint(src: &str) -> Vec<Diagnostic> {
    let engine = create_default_engine().expect("default engine");
    engine.lint_source(src).expect("linting should succeed")
}

fn messages_for<'a>(diags: &'a [Diagnostic], lint: &str) -> Vec<&'a str> {
    diags
        .iter()
        .filter(|d| d.lint.name == lint)
        .map(|d| d.message.as_str())
        .collect()
}

#[test]
fn strict_camel_case_suggests_word_casing() {
    let diags = lint("let aVAR = 1;\nexport default aVAR;");
    assert_eq!(
        messages_for(&diags, "strict_camel_case"),
        [
            r#"Identifier "aVAR" is not in strict camel case, should be "aVar"."#,
            r#"Identifier "aVAR" is not in strict camel case, should be "aVar"."#,
        ]
    );
}

#[test]
fn strict_camel_case_private_members() {
    let diags = lint("class Box { #rawHTML = ''; #count = 1; }");
    assert_eq!(
        messages_for(&diags, "strict_camel_case"),
        [r##""Private member #rawHTML" is not in strict camel case, should be "#rawHtml"."##]
    );
}

#[test]
fn strict_camel_case_accepts_plain_camel_case() {
    let diags = lint("const xmlHttpRequest = new XMLHttpRequest();\nfunction getUrl(id) { return id; }");
    assert!(messages_for(&diags, "strict_camel_case").is_empty());
}

#[test]
fn import_path_order_on_one_line() {
    let diags = lint(r#"import Bravo from "Bravo"; import Alpha from "Alpha";"#);
    assert_eq!(
        messages_for(&diags, "ordered_imports_by_path"),
        ["Sort imports alphabetically by path. `Alpha` should come before `Bravo`"]
    );
}

#[test]
fn import_members_report_the_unsorted_member() {
    let diags = lint("import { beta, alpha } from 'greek';");
    let members: Vec<&Diagnostic> = diags
        .iter()
        .filter(|d| d.lint.name == "ordered_import_members")
        .collect();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].span.start.column, 16);
    assert!(members[0].suggestion.is_some());
}

#[test]
fn destructuring_order() {
    let diags = lint("const { zed, alpha } = source;");
    assert_eq!(
        messages_for(&diags, "ordered_destructuring"),
        ["alpha should come before zed"]
    );
}

#[test]
fn triple_negation_is_too_tall() {
    let diags = lint("const flag = !!!value;");
    assert_eq!(
        messages_for(&diags, "logical_expression_complexity"),
        ["Expression height is 3; max allowed is 2"]
    );
}

#[test]
fn tsx_sources_need_the_tsx_grammar() {
    let engine = create_default_engine().unwrap();
    let src = "const node = <div className=\"x\">{a && b && c && d}</div>;";
    let diags = engine.lint_source_as(src, Dialect::Tsx).unwrap();
    assert_eq!(
        messages_for(&diags, "logical_expression_complexity"),
        ["Expression height is 3; max allowed is 2"]
    );
}

#[test]
fn syntax_errors_are_errors_not_diagnostics() {
    let engine = create_default_engine().unwrap();
    assert!(engine.lint_source("import { from;").is_err());
}

#[test]
fn diagnostics_come_back_in_source_order() {
    let diags = lint("const { b, a } = o;\nconst value = !!!flag;\nimport { d, c } from 'x';");
    let starts: Vec<usize> = diags.iter().map(|d| d.range.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
}

#[test]
fn per_file_state_starts_fresh() {
    let engine = create_default_engine().unwrap();
    let src = "let aVAR = !!!flag;";
    for _ in 0..2 {
        let diags = engine.lint_source(src).unwrap();
        assert_eq!(
            messages_for(&diags, "strict_camel_case"),
            [r#"Identifier "aVAR" is not in strict camel case, should be "aVar"."#]
        );
        assert_eq!(
            messages_for(&diags, "logical_expression_complexity"),
            ["Expression height is 3; max allowed is 2"]
        );
    }
}
