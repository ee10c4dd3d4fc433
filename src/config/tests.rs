use super::*;

const SECRET: &str = "0123456789abcdef0123";

fn raw() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.auth.jwt_secret = Some(SECRET.to_string());
    raw
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(raw()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.cache.redis_url.is_none());
    assert_eq!(settings.cache.memory_capacity.get(), 10_000);
    assert_eq!(settings.auth.token_ttl, Duration::from_secs(21_600));
    assert_eq!(settings.auth.login_attempt_threshold.get(), 5);
    assert_eq!(settings.auth.login_lock, Duration::from_secs(300));
}

#[test]
fn missing_jwt_secret_is_rejected() {
    let err = Settings::from_raw(RawSettings::default()).expect_err("secret required");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "auth.jwt_secret",
            ..
        }
    ));
}

#[test]
fn short_jwt_secret_is_rejected() {
    let mut raw = raw();
    raw.auth.jwt_secret = Some("short".into());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_urls_fall_back_to_in_process_backends() {
    let mut raw = raw();
    raw.database.url = Some("   ".into());
    raw.cache.redis_url = Some(String::new());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
    assert!(settings.cache.redis_url.is_none());
}

#[test]
fn zero_cache_capacity_is_invalid() {
    let mut raw = raw();
    raw.cache.memory_capacity = Some(0);
    let err = Settings::from_raw(raw).expect_err("capacity must be positive");
    assert!(err.to_string().contains("cache.memory_capacity"));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["snapshare"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "snapshare",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-redis-url",
        "redis://cache:6379",
        "--log-json=true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(
                serve.overrides.cache_redis_url.as_deref(),
                Some("redis://cache:6379")
            );
            assert_eq!(serve.overrides.log_json, Some(true));
        }
    }
}
