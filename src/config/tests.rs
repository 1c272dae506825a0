use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::*;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config file");
    file.write_all(contents.as_bytes())
        .expect("write temp config");
    file
}

fn check_args(file: &NamedTempFile, extra: &[&str]) -> CliArgs {
    let path = file.path().to_str().expect("utf-8 temp path");
    let mut argv = vec!["lda", "--config-file", path];
    argv.extend_from_slice(extra);
    argv.push("check");
    CliArgs::parse_from(argv)
}

#[test]
fn defaults_apply_without_configuration() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.api.base.is_none());
    assert_eq!(settings.api.default_page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(settings.api.max_page_size, MAX_PAGE_SIZE);
    assert!(settings.api.prefixes.is_empty());
    assert!(settings.api.variables.is_empty());
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.policy, CachePolicy::LimitEntries { limit: 100 });
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.cache.policy = Some("perma-cache".to_string());

    let overrides = Overrides {
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        cache_policy: Some("limit-entries:5".to_string()),
        ..Default::default()
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert_eq!(settings.cache.policy, CachePolicy::LimitEntries { limit: 5 });
}

#[test]
fn malformed_cache_policy_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.policy = Some("limit-entries:many".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.policy",
            ..
        }
    ));
}

#[test]
fn malformed_base_uri_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.base = Some("not a url".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(err, LoadError::Invalid { key: "api.base", .. }));
}

#[test]
fn reserved_prefixes_are_rejected() {
    for prefix in ["pre", "unknown", "has_underscore"] {
        let mut raw = RawSettings::default();
        raw.api
            .prefixes
            .insert(prefix.to_string(), "http://example.org/".to_string());

        let err = Settings::from_raw(raw).unwrap_err();
        assert!(
            matches!(err, LoadError::Invalid { key: "api.prefixes", .. }),
            "{prefix}"
        );
    }
}

#[test]
fn page_sizes_are_validated() {
    let mut raw = RawSettings::default();
    raw.api.default_page_size = Some(50);
    raw.api.max_page_size = Some(20);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = RawSettings::default();
    raw.api.max_page_size = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
#[serial]
fn file_configuration_is_loaded() {
    let file = config_file(
        r#"
[logging]
level = "warn"

[api]
base = "http://example.org/api/"
default_page_size = 5

[api.prefixes]
rdf = "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
ex = "http://example.org/"

[api.variables]
greeting = "hello {name}"
name = "world"
kind = { value = "ex_Thing", type = "resource" }
label = { value = "bonjour", lang = "fr" }

[[api.endpoints]]
name = "things"
select = "?item a <{kind}>"
page_size = 50

[cache]
policy = "limit-entries:2"
"#,
    );

    let settings = load(&check_args(&file, &[])).expect("valid configuration");

    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert_eq!(
        settings.api.base.as_ref().map(Url::as_str),
        Some("http://example.org/api/")
    );
    assert_eq!(settings.api.prefixes.len(), 2);
    assert_eq!(settings.cache.policy, CachePolicy::LimitEntries { limit: 2 });

    let mut variables = settings.api.variables.copy();
    assert_eq!(
        variables.get_value_string("greeting").expect("expands"),
        Some("hello world".to_string())
    );
    assert_eq!(
        variables.get("kind").expect("resolves"),
        Some(Value::resource("http://example.org/Thing"))
    );
    assert_eq!(
        variables.get("label").expect("resolves"),
        Some(Value::lang("bonjour", "fr"))
    );
    assert_eq!(
        variables.path_as_url("items/1").expect("base configured").as_str(),
        "http://example.org/api/items/1"
    );

    let endpoint = &settings.api.endpoints[0];
    assert_eq!(endpoint.name, "things");
    assert_eq!(endpoint.default_page_size, 50);
    assert_eq!(endpoint.max_page_size, MAX_PAGE_SIZE);
}

#[test]
#[serial]
fn environment_overrides_file_and_cli_overrides_environment() {
    let file = config_file(
        r#"
[cache]
policy = "perma-cache"
enabled = true
"#,
    );

    // SAFETY: serialised with every other environment-touching test.
    unsafe {
        std::env::set_var("LDA__CACHE__POLICY", "limit-entries:7");
        std::env::set_var("LDA__CACHE__ENABLED", "false");
    }

    let from_env = load(&check_args(&file, &[]));
    let from_cli = load(&check_args(&file, &["--cache-policy", "default"]));

    unsafe {
        std::env::remove_var("LDA__CACHE__POLICY");
        std::env::remove_var("LDA__CACHE__ENABLED");
    }

    let from_env = from_env.expect("valid configuration");
    assert_eq!(from_env.cache.policy, CachePolicy::LimitEntries { limit: 7 });
    assert!(!from_env.cache.enabled);

    let from_cli = from_cli.expect("valid configuration");
    assert_eq!(from_cli.cache.policy, CachePolicy::default());
}

#[test]
#[serial]
fn missing_explicit_config_file_is_an_error() {
    let args = CliArgs::parse_from([
        "lda",
        "--config-file",
        "/nonexistent/lda-config.toml",
        "check",
    ]);
    assert!(matches!(load(&args), Err(LoadError::Build(_))));
}

#[test]
fn resource_defaults_keep_unknown_or_templated_forms() {
    let prefixes = PrefixTable::from_pairs([("ex", "http://example.org/")]).expect("prefixes");

    let templated = Value::resource("ex_{local}");
    assert_eq!(expand_resource_shortname(templated.clone(), &prefixes), templated);

    let unregistered = Value::resource("zz_Thing");
    assert_eq!(
        expand_resource_shortname(unregistered.clone(), &prefixes),
        unregistered
    );

    let plain = Value::plain("ex_Thing");
    assert_eq!(expand_resource_shortname(plain.clone(), &prefixes), plain);
}

#[test]
fn conflicting_variable_tags_are_rejected() {
    let raw = RawVariable::Tagged {
        value: "x".to_string(),
        datatype: Some("resource".to_string()),
        lang: Some("en".to_string()),
    };
    assert!(raw.into_value().is_err());
}

#[test]
fn parse_expand_arguments() {
    let args = CliArgs::parse_from([
        "lda",
        "expand",
        "{greeting}, {name}",
        "--param",
        "name=Ada",
        "-p",
        "title=a=b",
    ]);

    match args.command {
        Command::Expand(expand) => {
            assert_eq!(expand.template, "{greeting}, {name}");
            assert_eq!(
                expand.params,
                vec![
                    ("name".to_string(), "Ada".to_string()),
                    ("title".to_string(), "a=b".to_string()),
                ]
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn global_overrides_follow_the_subcommand() {
    let args = CliArgs::parse_from(["lda", "encode", "http://example.org/a", "--log-json", "yes"]);
    assert_eq!(args.overrides.log_json, Some(true));
    assert!(matches!(args.command, Command::Encode(_)));
}

#[test]
fn malformed_params_are_rejected_by_the_parser() {
    assert!(CliArgs::try_parse_from(["lda", "expand", "{x}", "--param", "novalue"]).is_err());
    assert!(CliArgs::try_parse_from(["lda", "expand", "{x}", "--param", "=v"]).is_err());
}
