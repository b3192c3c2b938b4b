use std::fs;

use scriptify::terminal::launch::{
    load_service_env, merge_env, parse_env_pair, service_env_path, BootstrapProbe,
};

#[test]
fn test_service_env_then_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        service_env_path(dir.path(), "billing"),
        "# billing worker\nexport APP_ENV=production\nDB_NAME=\"billing\"\n",
    )
    .unwrap();

    let file_env = load_service_env(dir.path(), "billing").unwrap();
    let overrides = vec![
        parse_env_pair("APP_ENV=staging").unwrap(),
        parse_env_pair("DEBUG=1").unwrap(),
        parse_env_pair("APP_ENV=local").unwrap(),
    ];
    let env = merge_env(file_env, &overrides);

    assert_eq!(env.len(), 3);
    assert_eq!(env["APP_ENV"], "local");
    assert_eq!(env["DB_NAME"], "billing");
    assert_eq!(env["DEBUG"], "1");
}

#[test]
fn test_service_env_path_convention() {
    let path = service_env_path(std::path::Path::new("/etc/scriptify"), "mailer");
    assert_eq!(path, std::path::PathBuf::from("/etc/scriptify/mailer.env"));
}

#[test]
fn test_bootstrap_next_to_executable() {
    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    let vendor = dir.path().join("vendor");
    fs::create_dir(&bin).unwrap();
    fs::create_dir(&vendor).unwrap();
    fs::write(vendor.join("autoload.php"), "<?php\n").unwrap();

    let probe = BootstrapProbe {
        explicit: None,
        cwd: dir.path().join("elsewhere"),
        exe_dir: Some(bin),
        extra: Vec::new(),
    };
    assert_eq!(
        probe.discover().unwrap(),
        fs::canonicalize(vendor.join("autoload.php")).unwrap()
    );
}
