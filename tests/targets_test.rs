//! Target list tests

use secrecy::ExposeSecret;
use sng_exporter::config::ProbeConfig;
use sng_exporter::targets::*;

const SITE_LIST: &str = "ENDPOINT\tMETHOD\tAUTHTYPE\tUSER\tPASSWORD\tACCEPT\tPAYLOAD
https://www.example.com:5000/api/v2/status\tGET\tbasic\tmonitor\ts3cret\tapplication/json\t
# https://disabled.example.com/\tGET\t\t\t\t\t
https://plain.example.org/health\tPOST\tnone\t\t\ttext/plain\t{\"ping\":1}
not a url\tGET\t\t\t\t\t
";

#[test]
fn test_parse_sites_skips_header_comments_and_bad_urls() {
    let sites = parse_sites(SITE_LIST);

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].host, "www.example.com:5000");
    assert_eq!(sites[1].host, "plain.example.org");
}

#[test]
fn test_parse_sites_reads_every_column() {
    let sites = parse_sites(SITE_LIST);
    let site = &sites[0];

    assert_eq!(site.endpoint.as_str(), "https://www.example.com:5000/api/v2/status");
    assert_eq!(site.method, "GET");
    assert!(site.uses_basic_auth());
    assert_eq!(site.user, "monitor");
    assert_eq!(site.password.expose_secret(), "s3cret");
    assert_eq!(site.accept, "application/json");
    assert_eq!(site.payload, "");

    let post = &sites[1];
    assert_eq!(post.method, "POST");
    assert!(!post.uses_basic_auth());
    assert_eq!(post.payload, "{\"ping\":1}");
}

#[test]
fn test_parse_sites_tolerates_missing_columns() {
    let sites = parse_sites("header\nhttp://10.0.0.5:8080/\n");

    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].method, "GET");
    assert_eq!(sites[0].host, "10.0.0.5:8080");
    assert!(sites[0].accept.is_empty());
}

#[test]
fn test_parse_hosts() {
    let hosts = parse_hosts("example.com\n# commented.example.com\n\nmail.example.org\textra\n");

    assert_eq!(hosts, vec!["example.com".to_string(), "mail.example.org".to_string()]);
}

#[test]
fn test_load_from_files() {
    // Given: Site and host lists on disk
    let dir = tempfile::tempdir().unwrap();
    let sites = dir.path().join("sites.tsv");
    let hosts = dir.path().join("hosts.tsv");
    std::fs::write(&sites, SITE_LIST).unwrap();
    std::fs::write(&hosts, "example.com\n").unwrap();

    let config = ProbeConfig {
        site_list: Some(sites.to_string_lossy().into_owned()),
        dns_list: Some(hosts.to_string_lossy().into_owned()),
        ..ProbeConfig::default()
    };

    // When: Loading the target set
    let targets = TargetSet::load(&config).expect("Failed to load targets");

    // Then: Both lists are populated
    assert_eq!(targets.sites.len(), 2);
    assert_eq!(targets.hosts, vec!["example.com".to_string()]);
    assert!(!targets.is_empty());
}

#[test]
fn test_missing_list_is_an_error() {
    let config = ProbeConfig {
        dns_list: Some("/nonexistent/hosts.tsv".to_string()),
        ..ProbeConfig::default()
    };

    let err = TargetSet::load(&config).unwrap_err();

    assert!(err.to_string().contains("/nonexistent/hosts.tsv"));
}

#[test]
fn test_reload_picks_up_changes() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = dir.path().join("hosts.tsv");
    std::fs::write(&hosts, "a.example.com\n").unwrap();
    let config = ProbeConfig {
        dns_list: Some(hosts.to_string_lossy().into_owned()),
        ..ProbeConfig::default()
    };
    let mut targets = TargetSet::load(&config).unwrap();

    std::fs::write(&hosts, "a.example.com\nb.example.com\n").unwrap();
    targets.reload(&config);

    assert_eq!(targets.hosts.len(), 2);
}

#[test]
fn test_failed_reload_keeps_previous_lists() {
    // Given: A loaded host list whose file then disappears
    let dir = tempfile::tempdir().unwrap();
    let hosts = dir.path().join("hosts.tsv");
    std::fs::write(&hosts, "a.example.com\n").unwrap();
    let config = ProbeConfig {
        dns_list: Some(hosts.to_string_lossy().into_owned()),
        ..ProbeConfig::default()
    };
    let mut targets = TargetSet::load(&config).unwrap();
    std::fs::remove_file(&hosts).unwrap();

    // When: Reloading
    targets.reload(&config);

    // Then: The old list is still in place
    assert_eq!(targets.hosts, vec!["a.example.com".to_string()]);
}
