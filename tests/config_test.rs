// ==========================================
// 配置加载集成测试
// ==========================================
// 测试范围:
// 1. TOML 文件 + 环境变量覆写
// 2. 非法配置拒绝（含越界窗口）
// 3. 点分覆写全部成功才生效
// 4. 重新加载
// ==========================================

use liturgy_roster::config::{ConfigError, ConfigManager, RosterConfig, MAX_WINDOW_DAYS};
use liturgy_roster::domain::RoleCode;
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(text.as_bytes()).expect("写入临时文件失败");
    file
}

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_file_then_env_layering() {
    let file = toml_file(
        r#"
[general]
overlap_minutes = 90

[fairness]
workload_tolerance = 3

[role_packs.sizes]
2 = ["LIB", "TUR"]
"#,
    );

    let manager = ConfigManager::load_with_env(
        Some(file.path()),
        env(&[
            ("LITURGY_ROSTER__FAIRNESS__WORKLOAD_TOLERANCE", "1"),
            ("UNRELATED", "x"),
        ]),
    )
    .unwrap();
    let config = manager.current().unwrap();

    assert_eq!(config.general.overlap_minutes, 90);
    assert_eq!(config.fairness.workload_tolerance, 1);
    // 未写的项保持默认
    assert_eq!(config.fairness.fair_window_days, 90);
    assert_eq!(config.role_packs.sizes[&2], vec![RoleCode::Lib, RoleCode::Tur]);
    assert_eq!(manager.source_path(), Some(file.path()));
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = toml_file("[fairness]\nfair_window_days = 0\n");
    let err = ConfigManager::load_with_env(Some(file.path()), Vec::new()).err().unwrap();
    assert!(matches!(err, ConfigError::OutOfRange { .. }));

    let file = toml_file("[role_packs.sizes]\n3 = [\"LIB\"]\n");
    assert!(ConfigManager::load_with_env(Some(file.path()), Vec::new()).is_err());
}

#[test]
fn test_oversized_windows_are_rejected_at_load() {
    let file = toml_file("[fairness]\nfair_window_days = 100000000\n");
    let err = ConfigManager::load_with_env(Some(file.path()), Vec::new()).err().unwrap();
    assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "fairness.fair_window_days"));

    let err = ConfigManager::load_with_env(
        None,
        env(&[("LITURGY_ROSTER__GENERAL__OVERLAP_MINUTES", "100000")]),
    )
    .err()
    .unwrap();
    assert!(matches!(err, ConfigError::OutOfRange { .. }));

    let manager = ConfigManager::with_defaults();
    let over = (MAX_WINDOW_DAYS + 1).to_string();
    assert!(manager
        .apply_overrides(&[("general.default_view_days", over.as_str())])
        .is_err());
    assert_eq!(*manager.current().unwrap(), RosterConfig::default());
}

#[test]
fn test_unknown_env_key_is_an_error() {
    let err = ConfigManager::load_with_env(None, env(&[("LITURGY_ROSTER__NOPE__X", "1")]))
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::UnknownKey(_)));
}

#[test]
fn test_overrides_apply_all_or_nothing() {
    let manager = ConfigManager::with_defaults();

    let err = manager
        .apply_overrides(&[("weights.recency", "2.0"), ("weights.load_balance", "abc")])
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
    assert_eq!(*manager.current().unwrap(), RosterConfig::default());

    let next = manager
        .apply_overrides(&[("weights.recency", "2.0"), ("packs.1", "CRU")])
        .unwrap();
    assert_eq!(next.weights.recency, 2.0);
    assert_eq!(next.role_packs.sizes[&1], vec![RoleCode::Cru]);
}

#[test]
fn test_snapshot_is_unaffected_by_later_replace() {
    let manager = ConfigManager::with_defaults();
    let held = manager.current().unwrap();

    let mut changed = RosterConfig::default();
    changed.general.overlap_minutes = 60;
    manager.replace(changed).unwrap();

    assert_eq!(held.general.overlap_minutes, 110);
    assert_eq!(manager.current().unwrap().general.overlap_minutes, 60);
}

#[test]
fn test_reload_reads_file_again() {
    let file = toml_file("[general]\noverlap_minutes = 100\n");
    let manager = ConfigManager::load_with_env(Some(file.path()), Vec::new()).unwrap();
    assert_eq!(manager.current().unwrap().general.overlap_minutes, 100);

    std::fs::write(file.path(), "[general]\noverlap_minutes = 45\n").unwrap();
    let reloaded = manager.reload().unwrap();
    assert_eq!(reloaded.general.overlap_minutes, 45);
}

#[test]
fn test_toml_snapshot_round_trips() {
    let manager = ConfigManager::with_defaults();
    let text = manager.snapshot_toml().unwrap();
    let parsed = RosterConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed, RosterConfig::default());
    assert!(manager.snapshot_json().unwrap().contains("\"overlap_minutes\":110"));
}
