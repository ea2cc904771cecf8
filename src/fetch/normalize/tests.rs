use super::*;
use serde_json::json;

fn record(value: serde_json::Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn unnests_requested_include() {
    let raw = record(json!({
        "id": 271,
        "name": "Superliga",
        "country": {"data": {"id": 320, "name": "Denmark"}}
    }));

    let out = normalize(raw, &Includes::from("country")).unwrap();
    assert_eq!(out["country"], json!({"id": 320, "name": "Denmark"}));
    assert_eq!(out["id"], 271);
}

#[test]
fn unnests_one_to_many_include_preserving_order() {
    let raw = record(json!({
        "id": 1,
        "seasons": {"data": [{"id": 3}, {"id": 1}, {"id": 2}]}
    }));

    let out = normalize(raw, &Includes::from("seasons")).unwrap();
    let ids: Vec<i64> = out["seasons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [3, 1, 2]);
}

#[test]
fn unnests_scalar_list_include() {
    // `{'country_ids': {'data': [1, 2, 3]}}` flattens to `{'country_ids': [1, 2, 3]}`.
    let raw = record(json!({"country_ids": {"data": [1, 2, 3]}}));
    let out = normalize(raw, &Includes::from("country_ids")).unwrap();
    assert_eq!(out["country_ids"], json!([1, 2, 3]));
}

#[test]
fn unnests_nested_envelopes_recursively() {
    let raw = record(json!({
        "a": 1,
        "b": [1, 2, 3],
        "c": "foo",
        "d": {"data": {
            "p": 1,
            "q": [1, 2, 3],
            "r": "foo",
            "s": {"data": {"x": 1, "z": "foo"}}
        }}
    }));

    let out = normalize(raw, &Includes::from("d")).unwrap();
    assert_eq!(
        out["d"],
        json!({
            "p": 1,
            "q": [1, 2, 3],
            "r": "foo",
            "s": {"x": 1, "z": "foo"}
        })
    );
}

#[test]
fn unnests_envelopes_inside_included_lists() {
    let raw = record(json!({
        "d": {"data": {
            "s": {"data": {"y": {"data": [
                {"a": 1, "b": {"data": {"c": "foo"}}},
                {"a": 2, "b": {"data": {"c": "bar"}}},
                {"a": 3, "b": {"data": {"c": "foobar"}}}
            ]}}}
        }}
    }));

    let out = normalize(raw, &Includes::from("d")).unwrap();
    assert_eq!(
        out["d"]["s"]["y"],
        json!([
            {"a": 1, "b": {"c": "foo"}},
            {"a": 2, "b": {"c": "bar"}},
            {"a": 3, "b": {"c": "foobar"}}
        ])
    );
}

#[test]
fn empty_includes_strip_all_include_shaped_fields() {
    let raw = record(json!({
        "id": 1,
        "name": "foo",
        "country": {"data": {"id": 2}},
        "seasons": {"data": [{"id": 3}]}
    }));

    let out = normalize(raw, &Includes::none()).unwrap();
    assert_eq!(Value::Object(out), json!({"id": 1, "name": "foo"}));
}

#[test]
fn requested_but_absent_include_is_omitted_not_null() {
    let raw = record(json!({"id": 1}));
    let out = normalize(raw, &Includes::from("country")).unwrap();
    assert!(!out.contains_key("country"));
}

#[test]
fn requested_include_returned_as_null_is_omitted() {
    let raw = record(json!({"id": 1, "country": null}));
    let out = normalize(raw, &Includes::from("country")).unwrap();
    assert!(!out.contains_key("country"));
}

#[test]
fn plain_fields_pass_through_unexamined() {
    let raw = record(json!({
        "id": 1,
        "scores": [0, 1, 2],
        "venue_id": null,
        "meta": {"attendance": 20000}
    }));

    let out = normalize(raw.clone(), &Includes::none()).unwrap();
    assert_eq!(out, raw);
}

#[test]
fn unrequested_field_with_a_data_sub_key_passes_through() {
    // Only a single-key `{"data": ...}` object is include-shaped; a plain
    // field that happens to contain a `data` sub-key is not stripped.
    let raw = record(json!({
        "id": 1,
        "meta": {"data": [1, 2], "total": 2}
    }));

    let out = normalize(raw, &Includes::none()).unwrap();
    assert_eq!(out["meta"], json!({"data": [1, 2], "total": 2}));
}

#[test]
fn requested_include_that_is_scalar_is_malformed() {
    let raw = record(json!({"id": 1, "country": 320}));
    let err = normalize(raw, &Includes::from("country")).unwrap_err();
    assert!(matches!(err, SportmonksError::MalformedResponse { .. }));
}

#[test]
fn envelope_with_extra_keys_is_malformed() {
    let raw = record(json!({
        "country": {"data": {"id": 1}, "extra": true}
    }));
    let err = normalize(raw, &Includes::from("country")).unwrap_err();
    assert!(matches!(err, SportmonksError::MalformedResponse { .. }));
}

#[test]
fn dotted_include_names_match_their_top_level_field() {
    let raw = record(json!({
        "results": {"data": [{"id": 1, "league": {"data": {"id": 5}}}]}
    }));

    let out = normalize(raw, &Includes::from("results.league")).unwrap();
    assert_eq!(out["results"], json!([{"id": 1, "league": {"id": 5}}]));
}

#[test]
fn output_preserves_field_order() {
    let raw = record(json!({
        "z": 1,
        "country": {"data": {"id": 2}},
        "a": 3
    }));

    let out = normalize(raw, &Includes::from("country")).unwrap();
    let keys: Vec<&str> = out.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "country", "a"]);
}
