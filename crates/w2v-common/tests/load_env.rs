use w2v_common::config::{Method, W2vConfig};
use w2v_common::VectorError;

// Single test: it mutates process environment.
#[test]
fn load_reads_file_named_by_w2v_config() {
    let path = std::env::temp_dir().join(format!("w2v-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "client:\n  endpoint: \"http://localhost:3030/convert/\"\n  method: post\nbench:\n  loops: 4\n").unwrap();

    std::env::set_var("W2V_CONFIG", &path);
    let cfg = W2vConfig::load().unwrap();
    assert_eq!(cfg.client.endpoint, "http://localhost:3030/convert/");
    assert_eq!(cfg.client.method, Method::Post);
    assert_eq!(cfg.bench.loops, 4);
    assert_eq!(cfg.bench.entries, 10_000);

    std::fs::remove_file(&path).unwrap();
    let err = W2vConfig::load().unwrap_err();
    assert!(matches!(err, VectorError::InvalidConfig(_)));

    std::env::remove_var("W2V_CONFIG");
    std::env::set_var("W2V_LOOPS", "12");
    let cfg = W2vConfig::load().unwrap();
    assert_eq!(cfg.bench.loops, 12);
    std::env::remove_var("W2V_LOOPS");
}
