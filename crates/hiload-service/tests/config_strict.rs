#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use hiload_service::config::{self, ServiceConfig};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
service:
  port: 3001
synthetic:
  slow_minms: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.service.port, 3001);
    assert_eq!(cfg.service.host, "0.0.0.0");
    assert_eq!(cfg.service.name, "high-load-system");
    assert_eq!(cfg.synthetic.slow_min_ms, 1000);
    assert_eq!(cfg.synthetic.slow_max_ms, 4000);
    assert!(cfg.metrics.process_metrics);
    assert_eq!(cfg.listen_addr(), "0.0.0.0:3001");
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
service:
  name: demo
  host: 127.0.0.1
  port: 8080
metrics:
  process_metrics: false
  summary_max_samples: 64
synthetic:
  slow_min_ms: 10
  slow_max_ms: 20
  cpu_iterations: 1000
  memory_items: 10
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
    assert!(!cfg.metrics.process_metrics);
    assert_eq!(cfg.metrics.summary_max_samples, 64);
    assert_eq!(cfg.synthetic.memory_items, 10);
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn slow_range_must_be_ordered() {
    let bad = r#"
version: 1
synthetic:
  slow_min_ms: 4000
  slow_max_ms: 1000
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("slow_min_ms"));
}

#[test]
fn zero_summary_window_rejected() {
    let bad = "version: 1\nmetrics:\n  summary_max_samples: 0\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn port_override() {
    let mut cfg = ServiceConfig::default();
    config::apply_port_override(&mut cfg, Some("4242")).unwrap();
    assert_eq!(cfg.service.port, 4242);

    config::apply_port_override(&mut cfg, None).unwrap();
    assert_eq!(cfg.service.port, 4242);

    let err = config::apply_port_override(&mut cfg, Some("http")).unwrap_err();
    assert_eq!(err.client_code().as_str(), "INVALID_CONFIG");
}
