use sng_exporter::config::Config;

#[test]
fn test_config_load() {
    // This assumes config/Default.toml exists relative to where cargo test is run
    let config_res = Config::load("config/Default.toml");
    assert!(config_res.is_ok(), "Failed to load default config");

    let config = config_res.unwrap();
    assert!(config.validate().is_ok(), "Default config must validate");
    assert_eq!(config.server.port, 9500);
    assert!(config.syslog_ng.enabled);
}
