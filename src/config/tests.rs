use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.templates.root, PathBuf::from("templates"));
    assert_eq!(settings.templates.extension.as_str(), ".jsp");
    assert!(settings.templates.content_type.starts_with("text/"));
    assert_eq!(settings.results.default_result, "ok");
    assert!(settings.results.aliases.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.templates.extension = Some(".html".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        templates: TemplateOverrides {
            templates_extension: Some(".ftl".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.templates.extension.as_str(), ".ftl");
}

#[test]
fn content_type_follows_extension_unless_configured() {
    let mut raw = RawSettings::default();
    raw.templates.extension = Some(".html".to_string());
    let settings = Settings::from_raw(raw.clone()).expect("valid settings");
    assert_eq!(settings.templates.content_type, "text/html");

    raw.templates.content_type = Some("text/plain".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.templates.content_type, "text/plain");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn extension_without_leading_dot_is_rejected() {
    let mut raw = RawSettings::default();
    raw.templates.extension = Some("jsp".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid extension");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "templates.extension",
            ..
        }
    ));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_default_result_is_rejected() {
    let mut raw = RawSettings::default();
    raw.results.default_result = Some("  ".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid default result");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "results.default_result",
            ..
        }
    ));
}

#[test]
fn alias_names_must_not_contain_brackets() {
    let mut raw = RawSettings::default();
    raw.results
        .aliases
        .insert("<bad>".to_string(), "/x".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
#[serial_test::serial]
fn config_file_sections_are_deserialized() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("viewroute.toml");
    std::fs::write(
        &path,
        r#"
[templates]
root = "views"
extension = ".html"

[results]
default_result = "success"

[results.aliases]
login = "/auth/login"
"#,
    )
    .expect("write config");

    let cli = CliArgs::parse_from([
        "viewroute",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "resolve",
        "/book/view",
    ]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(settings.templates.root, PathBuf::from("views"));
    assert_eq!(settings.templates.extension.as_str(), ".html");
    assert_eq!(settings.results.default_result, "success");
    assert_eq!(
        settings.results.aliases.get("login").map(String::as_str),
        Some("/auth/login")
    );
}

#[test]
#[serial_test::serial]
fn environment_overrides_config_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("viewroute.toml");
    std::fs::write(&path, "[results]\ndefault_result = \"success\"\n").expect("write config");

    // SAFETY: serialized with every other test touching the environment.
    unsafe { std::env::set_var("VIEWROUTE__RESULTS__DEFAULT_RESULT", "done") };
    let cli = CliArgs::parse_from([
        "viewroute",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "resolve",
        "/book/view",
    ]);
    let loaded = load(&cli);
    unsafe { std::env::remove_var("VIEWROUTE__RESULTS__DEFAULT_RESULT") };

    let settings = loaded.expect("settings load");
    assert_eq!(settings.results.default_result, "done");
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["viewroute"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_resolve_arguments() {
    let args = CliArgs::parse_from([
        "viewroute",
        "resolve",
        "/book/view",
        "--result",
        "error",
        "--templates-root",
        "/srv/views",
    ]);

    match args.command.expect("resolve command") {
        Command::Resolve(resolve) => {
            assert_eq!(resolve.action, "/book/view");
            assert_eq!(resolve.result.as_deref(), Some("error"));
            assert_eq!(
                resolve.templates.templates_root.as_deref(),
                Some(std::path::Path::new("/srv/views"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "viewroute",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--templates-extension",
        ".html",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.templates.templates_extension.as_deref(),
                Some(".html")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}
