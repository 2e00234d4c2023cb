use json_path_finder as jpf;
use json_path_finder::JsonPathError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[test]
fn length_of_strings_arrays_and_objects() {
    let doc = r#"[{"name": "ab"}, {"name": "abcd"}]"#;
    assert_eq!(
        jpf::find(doc, "$[?length(@.name) == 2]").unwrap(),
        vec![json!({"name": "ab"})]
    );
    let doc = r#"[{"xs": [1, 2, 3]}, {"xs": []}]"#;
    assert_eq!(
        jpf::find(doc, "$[?length(@.xs) == 3]").unwrap(),
        vec![json!({"xs": [1, 2, 3]})]
    );
    let doc = r#"[{"m": {"a": 1}}, {"m": {}}]"#;
    assert_eq!(
        jpf::find(doc, "$[?length(@.m) == 1]").unwrap(),
        vec![json!({"m": {"a": 1}})]
    );
}

#[test]
fn length_of_missing_or_scalar_is_nothing() {
    // Nothing == 0 holds, so a missing key passes `length(...) == 0`
    let doc = r#"[{"x": 1}]"#;
    assert_eq!(
        jpf::find(doc, "$[?length(@.name) == 0]").unwrap(),
        vec![json!({"x": 1})]
    );
    assert_eq!(
        jpf::find(doc, "$[?length(@.x) == 1]").unwrap(),
        Vec::<Value>::new()
    );
}

#[test]
fn length_rejects_non_singular_argument() {
    let err = jpf::find(r#"[{"a": 1, "b": 2}]"#, "$[?length(@.*) > 0]").unwrap_err();
    assert!(matches!(err, JsonPathError::Query(_)), "got {err:?}");
}

#[test]
fn count_measures_nodelist_size() {
    let doc = r#"[{"a": 1, "b": 2}, {"a": 1}, {}]"#;
    assert_eq!(
        jpf::find(doc, "$[?count(@.*) == 2]").unwrap(),
        vec![json!({"a": 1, "b": 2})]
    );
    assert_eq!(jpf::find(doc, "$[?count(@.*) == 0]").unwrap(), vec![json!({})]);
    // a literal argument counts as a one-node list
    assert_eq!(jpf::find(doc, "$[?count(1) == 1]").unwrap().len(), 3);
}

#[test]
fn match_is_full_and_search_is_substring() {
    let doc = r#"[{"n": "xfooy"}, {"n": "foo"}]"#;
    assert_eq!(
        jpf::find(doc, r#"$[?match(@.n, "foo")]"#).unwrap(),
        vec![json!({"n": "foo"})]
    );
    assert_eq!(
        jpf::find(doc, r#"$[?search(@.n, "foo")]"#).unwrap(),
        vec![json!({"n": "xfooy"}), json!({"n": "foo"})]
    );
}

#[test]
fn regex_dot_does_not_cross_lines() {
    let doc = "[{\"n\": \"a\\nb\"}, {\"n\": \"axb\"}]";
    assert_eq!(
        jpf::find(doc, r#"$[?match(@.n, "a.b")]"#).unwrap(),
        vec![json!({"n": "axb"})]
    );
}

#[test]
fn regex_on_non_string_is_false_not_an_error() {
    let doc = r#"[{"n": 42}, {"n": "f"}]"#;
    assert_eq!(
        jpf::find(doc, r#"$[?match(@.n, "f")]"#).unwrap(),
        vec![json!({"n": "f"})]
    );
}

#[test]
fn value_unwraps_singular_query_results() {
    let doc = r#"[{"a": 1}, {"a": 2}]"#;
    assert_eq!(
        jpf::find(doc, "$[?value(@.a) == 1]").unwrap(),
        vec![json!({"a": 1})]
    );
}

#[test]
fn function_result_as_boolean_is_positive_number_or_cast() {
    let doc = r#"[{"name": "ab"}, {"name": ""}]"#;
    assert_eq!(
        jpf::find(doc, "$[?length(@.name)]").unwrap(),
        vec![json!({"name": "ab"})]
    );
}

#[test]
fn unknown_function_is_a_hard_error() {
    let err = jpf::find("[1]", "$[?nope(@)]").unwrap_err();
    assert!(matches!(err, JsonPathError::Query(_)), "got {err:?}");
}

#[test]
fn wrong_arity_is_a_hard_error() {
    let err = jpf::find("[1]", r#"$[?match(@)]"#).unwrap_err();
    assert!(matches!(err, JsonPathError::Query(_)), "got {err:?}");
}
