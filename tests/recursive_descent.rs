use json_path_finder as jpf;
use pretty_assertions::assert_eq;
use serde_json::json;

fn recursive_test_json() -> &'static str {
    r#"{
        "departments": [
            {
                "team": [
                    {
                        "name": "Alice Johnson",
                        "info": {
                            "position": "Software Engineer",
                            "age": 29,
                            "email": "alice.johnson@example.com"
                        }
                    },
                    {
                        "name": "Bob Smith",
                        "info": {
                            "position": "UI/UX Designer",
                            "age": 34,
                            "email": "bob.smith@example.com"
                        }
                    }
                ]
            },
            {
                "team": [
                    {
                        "name": "Carol Lee",
                        "info": {
                            "position": "Project Manager",
                            "age": 41,
                            "email": "carol.lee@example.com"
                        }
                    },
                    {
                        "name": "David Kim",
                        "info": {
                            "position": "QA Engineer",
                            "age": 27,
                            "email": "david.kim@example.com"
                        }
                    }
                ]
            }
        ]
    }"#
}

#[test]
fn all_names_in_document_order() {
    let out = jpf::find(recursive_test_json(), "$..name").unwrap();
    assert_eq!(
        out,
        vec![
            json!("Alice Johnson"),
            json!("Bob Smith"),
            json!("Carol Lee"),
            json!("David Kim")
        ]
    );
}

#[test]
fn descent_then_nested_name() {
    let out = jpf::find(recursive_test_json(), "$..info.position").unwrap();
    assert_eq!(
        out,
        vec![
            json!("Software Engineer"),
            json!("UI/UX Designer"),
            json!("Project Manager"),
            json!("QA Engineer")
        ]
    );
}

#[test]
fn descent_with_quoted_key_selector() {
    let out = jpf::find(recursive_test_json(), "$..['email']").unwrap();
    assert_eq!(
        out,
        vec![
            json!("alice.johnson@example.com"),
            json!("bob.smith@example.com"),
            json!("carol.lee@example.com"),
            json!("david.kim@example.com")
        ]
    );
}

#[test]
fn descendant_wildcard_includes_interior_and_leaves() {
    let out = jpf::find(r#"{"a": {"b": 1}}"#, "$..*").unwrap();
    assert_eq!(out, vec![json!({"b": 1}), json!(1)]);
}

#[test]
fn descent_with_filter() {
    let out = jpf::find(recursive_test_json(), "$..team[?@.info.age < 30].name").unwrap();
    assert_eq!(out, vec![json!("Alice Johnson"), json!("David Kim")]);
}

#[test]
fn descent_with_index() {
    let out = jpf::find(recursive_test_json(), "$..team[0].name").unwrap();
    assert_eq!(out, vec![json!("Alice Johnson"), json!("Carol Lee")]);
}
