use serde_json::json;
use w2v_client::Words;
use w2v_common::VectorError;

fn body(words: &Words) -> serde_json::Value {
    serde_json::to_value(words.payload()).unwrap()
}

#[test]
fn single_word_is_wrapped() {
    let words = Words::single("hello");
    assert_eq!(body(&words), json!({"words": ["hello"]}));
    assert_eq!(words.len(), 1);
}

#[test]
fn conversions_build_single_words() {
    assert_eq!(Words::from("hello"), Words::single("hello"));
    assert_eq!(Words::from(String::from("hello")).payload().words, ["hello"]);
}

#[test]
fn list_keeps_order() {
    let words = Words::list(["a", "b"]).unwrap();
    assert_eq!(body(&words), json!({"words": ["a", "b"]}));
}

#[test]
fn empty_list_rejected() {
    let err = Words::list(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, VectorError::InvalidInput(_)));
    assert!(Words::try_from(Vec::<String>::new()).is_err());
    assert!(Words::repeated("hello", 0).is_err());
}

#[test]
fn from_json_accepts_string_and_string_arrays() {
    assert_eq!(Words::from_json(&json!("hello")).unwrap(), Words::single("hello"));
    let words = Words::from_json(&json!(["a", "b", "c"])).unwrap();
    assert_eq!(words.as_slice(), ["a", "b", "c"]);
}

#[test]
fn from_json_rejects_other_shapes() {
    for value in [json!([]), json!(["a", 1]), json!(42), json!(null), json!({"words": ["a"]}), json!([["a"]])] {
        let err = Words::from_json(&value).unwrap_err();
        assert!(matches!(err, VectorError::InvalidInput(_)), "accepted {}", value);
    }
}

#[test]
fn repeated_builds_batch() {
    let words = Words::repeated("hello", 3).unwrap();
    assert_eq!(body(&words), json!({"words": ["hello", "hello", "hello"]}));
}
