use super::*;
use std::time::Duration;

#[test]
fn test_connect_config_defaults() {
    let cc = ConnectConfig::default();
    assert_eq!(cc.poll_interval_ms, 5_000);
    assert_eq!(cc.poll_ceiling, 40);
    assert_eq!(cc.progress_tick_ms, 900);
    assert_eq!(cc.grace_delay_ms, 2_000);
    assert_eq!(cc.progress_baseline, 50);
    assert_eq!(cc.progress_cap, 95);
}

#[test]
fn test_connect_config_from_toml() {
    let toml_str = r#"
        poll_interval_ms = 100
        poll_ceiling = 8
    "#;
    let cc: ConnectConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(cc.poll_interval_ms, 100);
    assert_eq!(cc.poll_ceiling, 8);
    assert_eq!(cc.progress_tick_ms, 900, "unset fields keep defaults");
}

#[test]
fn test_connect_duration_helpers() {
    let cc = ConnectConfig::default();
    assert_eq!(cc.poll_interval(), Duration::from_secs(5));
    assert_eq!(cc.progress_tick(), Duration::from_millis(900));
    assert_eq!(cc.grace_delay(), Duration::from_secs(2));
}

#[test]
fn test_full_config_parse() {
    let toml_str = r#"
        [console]
        name = "ops"
        log_level = "debug"

        [backend]
        base_url = "http://10.0.0.7:3000"

        [caller]
        user_id = "7"
        role = "admin"

        [connect]
        poll_ceiling = 12

        [blast]
        default_message = "Promo hari ini!"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.console.name, "ops");
    assert_eq!(cfg.console.log_level, "debug");
    assert_eq!(cfg.backend.base_url, "http://10.0.0.7:3000");
    assert_eq!(cfg.backend.timeout_secs, 30);
    assert!(cfg.caller.role.is_admin());
    assert_eq!(cfg.caller.identity().role.level(), "1");
    assert_eq!(cfg.connect.poll_ceiling, 12);
    assert_eq!(cfg.blast.default_message, "Promo hari ini!");
}

#[test]
fn test_minimal_config_only_console() {
    let cfg: Config = toml::from_str("[console]\n").unwrap();
    assert_eq!(cfg.console.name, "wablast");
    assert_eq!(cfg.backend.base_url, "http://localhost:3000");
    assert_eq!(cfg.caller.user_id, "1");
    assert!(!cfg.caller.role.is_admin());
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let (cfg, found) = load("/nonexistent/wablast.toml").unwrap();
    assert!(!found);
    assert_eq!(cfg.console.name, "wablast");
    assert_eq!(cfg.connect.poll_ceiling, 40);
    assert!(cfg.blast.default_message.is_empty());
}

#[test]
fn test_load_reads_existing_file() {
    let tmp = std::env::temp_dir().join("__wablast_test_load__");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("config.toml");
    std::fs::write(&path, "[console]\nname = \"ops\"\n").unwrap();

    let (cfg, found) = load(path.to_str().unwrap()).unwrap();
    assert!(found);
    assert_eq!(cfg.console.name, "ops");
    assert_eq!(cfg.connect.poll_ceiling, 40, "unset sections keep defaults");

    let _ = std::fs::remove_dir_all(&tmp);
}
