use super::*;
use crate::SkipReason;

const HOST: &str = "app.example.com";

fn mk_tls_ingress(name: &str, tls: Vec<IngressTLS>) -> Ingress {
    let mut ingress = mk_ingress("ns", name, vec![mk_rule(HOST, vec![("/", mk_backend("app", 8080))])]);
    ingress.spec.as_mut().unwrap().tls = Some(tls);
    ingress
}

fn tls_filename(test: &TestConfig) -> Option<&str> {
    test.proxy
        .find_frontend(HOST)
        .expect("frontend must exist")
        .tls
        .tls_filename
        .as_deref()
}

fn test_config() -> TestConfig {
    let mut test = TestConfig::default();
    test.add_service("ns", "app", 8080, &["10.0.0.1"]);
    test
}

#[test]
fn named_secret() {
    let mut test = test_config();
    test.add_tls_secret("ns", "app-tls");

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("app-tls", &[HOST])])]);
    assert!(logs.at(Level::WARN).is_empty(), "{logs:?}");
    assert_eq!(tls_filename(&test), Some("/ssl/ns_app-tls.pem"));
}

#[test]
fn empty_secret_uses_default() {
    let mut test = test_config();
    test.add_tls_secret("system", "default-tls");

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("", &[HOST])])]);
    assert!(logs.at(Level::WARN).is_empty(), "{logs:?}");
    assert_eq!(tls_filename(&test), Some("/ssl/system_default-tls.pem"));
}

#[test]
fn unreadable_secret_falls_back_to_default() {
    let mut test = test_config();
    test.add_tls_secret("system", "default-tls");

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("missing", &[HOST])])]);
    assert_eq!(tls_filename(&test), Some("/ssl/system_default-tls.pem"));

    let warning = logs
        .find(
            Level::WARN,
            "using default certificate due to an error reading secret",
        )
        .expect("fallback must be logged");
    assert_eq!(warning.field("secret"), Some("ns/missing"));
    assert_eq!(
        warning.field("error"),
        Some("secret not found: 'ns/missing'")
    );
}

#[test]
fn incomplete_secret_falls_back_to_default() {
    let mut test = test_config();
    test.add_tls_secret("system", "default-tls");
    test.store.apply_secret(mk_secret("ns", "partial", &["tls.crt"]));

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("partial", &[HOST])])]);
    assert_eq!(tls_filename(&test), Some("/ssl/system_default-tls.pem"));
    let warning = logs
        .find(
            Level::WARN,
            "using default certificate due to an error reading secret",
        )
        .expect("fallback must be logged");
    assert_eq!(
        warning.field("error"),
        Some("secret 'ns/partial' does not have tls/key pair")
    );
}

#[test]
fn custom_and_default_both_fail() {
    let mut test = test_config();

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("missing", &[HOST])])]);
    assert_eq!(tls_filename(&test), None);

    let warning = logs
        .find(Level::WARN, "skipping TLS secret of ingress")
        .expect("double failure must be logged");
    assert_eq!(warning.field("secret"), Some("missing"));
    assert_eq!(warning.field("ingress"), Some("ns/app"));
    assert_eq!(
        warning.field("error"),
        Some(
            "failed to use custom and default certificate. \
             custom: secret not found: 'ns/missing'; \
             default: secret not found: 'system/default-tls'"
        )
    );
    assert_eq!(test.metrics.skipped(SkipReason::Tls), 1);
}

#[test]
fn missing_default_fails_without_retry() {
    let mut test = test_config();

    let logs = test.sync(&[mk_tls_ingress("app", vec![mk_tls("", &[HOST])])]);
    assert_eq!(tls_filename(&test), None);

    let warning = logs
        .find(Level::WARN, "skipping default TLS secret of ingress")
        .expect("default failure must be logged");
    assert_eq!(
        warning.field("error"),
        Some("secret not found: 'system/default-tls'")
    );
    assert!(logs
        .find(
            Level::WARN,
            "using default certificate due to an error reading secret"
        )
        .is_none());
}

#[test]
fn first_certificate_wins() {
    let mut test = test_config();
    test.add_tls_secret("ns", "tls-1");
    test.add_tls_secret("ns", "tls-2");

    let logs = test.sync(&[
        mk_tls_ingress("ing-1", vec![mk_tls("tls-1", &[HOST])]),
        mk_tls_ingress("ing-2", vec![mk_tls("tls-2", &[HOST])]),
    ]);
    assert_eq!(tls_filename(&test), Some("/ssl/ns_tls-1.pem"));

    let warning = logs
        .find(Level::WARN, "skipping TLS secret of ingress")
        .expect("conflicting certificate must be logged");
    assert_eq!(warning.field("secret"), Some("tls-2"));
    assert_eq!(warning.field("ingress"), Some("ns/ing-2"));
    assert_eq!(
        warning.field("error"),
        Some("TLS of host 'app.example.com' was already assigned")
    );
}

#[test]
fn redeclared_certificate_is_accepted() {
    let mut test = test_config();
    test.add_tls_secret("ns", "tls-1");

    let logs = test.sync(&[
        mk_tls_ingress("ing-1", vec![mk_tls("tls-1", &[HOST])]),
        mk_tls_ingress("ing-2", vec![mk_tls("tls-1", &[HOST])]),
    ]);
    assert_eq!(tls_filename(&test), Some("/ssl/ns_tls-1.pem"));
    assert!(
        logs.find(Level::WARN, "skipping TLS secret of ingress")
            .is_none(),
        "{logs:?}"
    );
}

#[test]
fn uncovered_hosts_get_no_certificate() {
    let mut test = test_config();
    test.add_tls_secret("ns", "tls-1");

    test.sync(&[mk_tls_ingress(
        "app",
        vec![mk_tls("tls-1", &["other.example.com"])],
    )]);
    assert_eq!(tls_filename(&test), None);
    assert!(test.proxy.find_frontend("other.example.com").is_none());
}
