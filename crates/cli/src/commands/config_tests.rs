use super::*;

#[test]
fn kv_pairs_parse_into_a_map() {
    let data = parse_kv_pairs(vec!["app.conf=port=8080".into()]).expect("one entry");
    assert_eq!(data.get("app.conf"), Some(&"port=8080".to_string()));
}

#[test]
fn kv_pairs_reject_a_bare_key() {
    parse_kv_pairs(vec!["no-equals-sign".into()]).expect_err("missing '='");
}
