use craftsman_common::{
    config::DEFAULT_CONFIG_FILE, ensure_test_logging, CompilerConfig, CraftsmanConfig,
    VersionPolicy,
};
use semver::Version;
use tracing::info;

#[test]
fn test_config_file_roundtrip_on_disk() {
    ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    info!("Writing config to {}", path.display());

    let config = CraftsmanConfig {
        compiler: CompilerConfig::default()
            .with_version(Version::new(0, 8, 19))
            .with_optimizer_runs(200)
            .with_evm_version("paris"),
    };
    config.save_to(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("version = \"0.8.19\""));
    assert_eq!(CraftsmanConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    ensure_test_logging(None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, "[compiler]\nevm_version = \"shanghai\"\n").unwrap();

    let config = CraftsmanConfig::load_or_default(&path).unwrap();
    assert_eq!(config.compiler.version, VersionPolicy::Auto);
    assert_eq!(config.compiler.optimizer_runs, None);
    assert_eq!(config.compiler.evm_version.as_deref(), Some("shanghai"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = CraftsmanConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, CraftsmanConfig::default());
    assert!(CraftsmanConfig::load_from(dir.path().join("absent.toml")).is_err());
}
