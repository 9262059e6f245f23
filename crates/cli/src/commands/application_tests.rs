use super::*;

#[test]
fn native_application_carries_argv_and_env() {
    let app = build_application(
        "svc".into(),
        "1".into(),
        SpecBackend::Native,
        None,
        vec!["/bin/sleep".into(), "30".into()],
        None,
        vec!["KEY=value".into()],
    )
    .expect("native application");

    assert_eq!(app.backend, BackendKind::Native);
    assert_eq!(app.env.get("KEY"), Some(&"value".to_string()));
    assert_eq!(app.native_spec.expect("native spec").command, vec!["/bin/sleep", "30"]);
}

#[test]
fn cluster_application_requires_an_image() {
    let err = build_application("svc".into(), "1".into(), SpecBackend::Cluster, None, vec![], None, vec![])
        .expect_err("missing --image");
    assert!(err.to_string().contains("--image"));
}

#[test]
fn cluster_application_carries_the_image() {
    let app = build_application(
        "svc".into(),
        "1".into(),
        SpecBackend::Cluster,
        Some("repo/svc:1".into()),
        vec![],
        None,
        vec![],
    )
    .expect("cluster application");

    assert_eq!(app.backend, BackendKind::Cluster);
    assert_eq!(app.cluster_spec.expect("cluster spec").image, "repo/svc:1");
}

#[test]
fn resource_parses_its_three_fields() {
    let r = parse_resource("https://example.com/a,a.bin,deadbeef").expect("resource");
    assert_eq!(r.url, "https://example.com/a");
    assert_eq!(r.file_name, "a.bin");
    assert_eq!(r.md5, "deadbeef");
}

#[test]
fn resource_rejects_a_missing_field() {
    parse_resource("https://example.com/a,a.bin").expect_err("missing md5");
}

#[test]
fn kv_pairs_reject_a_bare_key() {
    parse_kv_pairs(vec!["no-equals-sign".into()]).expect_err("missing '='");
}
