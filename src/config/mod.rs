//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::BTreeMap, path::PathBuf, str::FromStr, sync::Arc};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::endpoint::{DEFAULT_PAGE_SIZE, EndpointSpec, MAX_PAGE_SIZE};
use crate::bindings::{BaseUriResolver, Bindings, NoBaseUri, RESOURCE_DATATYPE, Value};
use crate::cache::CachePolicy;
use crate::shortnames::{PrefixTable, is_usable_prefix};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "lda";
const ENV_PREFIX: &str = "LDA";
const RESOURCE_TYPE_ALIAS: &str = "resource";

/// Command-line arguments for the `lda` binary.
#[derive(Debug, Parser)]
#[command(name = "lda", version, about = "Linked-Data API request resolution tools")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "LDA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Expand a template against the configured variables.
    Expand(ExpandArgs),
    /// Encode a URI as a shortname.
    Encode(EncodeArgs),
    /// Decode a shortname back to its URI.
    Decode(DecodeArgs),
    /// Validate the configuration and print a summary.
    Check,
}

#[derive(Debug, Args, Clone)]
pub struct ExpandArgs {
    /// Template containing `{name}` placeholders.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Request parameter overlaid on the configured variables; repeatable.
    #[arg(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Args, Clone)]
pub struct EncodeArgs {
    #[arg(value_name = "URI")]
    pub uri: String,
}

#[derive(Debug, Args, Clone)]
pub struct DecodeArgs {
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the base URI partial resource paths resolve against.
    #[arg(long = "api-base", value_name = "URL", global = true)]
    pub api_base: Option<String>,

    /// Override the cache policy (`limit-entries[:N]`, `default`, `perma-cache`).
    #[arg(long = "cache-policy", value_name = "POLICY", global = true)]
    pub cache_policy: Option<String>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    if name.is_empty() {
        return Err(format!("parameter name must not be empty in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base: Option<Url>,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub prefixes: PrefixTable,
    /// Configured variables, carrying the resolver for `base`.
    pub variables: Bindings,
    pub endpoints: Vec<EndpointSpec>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub policy: CachePolicy,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    api: RawApiSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(base) = overrides.api_base.as_ref() {
            self.api.base = Some(base.clone());
        }
        if let Some(policy) = overrides.cache_policy.as_ref() {
            self.cache.policy = Some(policy.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            api,
            cache,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let api = build_api_settings(api)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            logging,
            api,
            cache,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base = api
        .base
        .and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .map(|value| {
            Url::parse(&value)
                .map_err(|err| LoadError::invalid("api.base", format!("`{value}`: {err}")))
        })
        .transpose()?;

    let default_page_size = positive(
        api.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        "api.default_page_size",
    )?;
    let max_page_size = positive(
        api.max_page_size.unwrap_or(MAX_PAGE_SIZE),
        "api.max_page_size",
    )?;
    if default_page_size > max_page_size {
        return Err(LoadError::invalid(
            "api.default_page_size",
            format!("{default_page_size} exceeds api.max_page_size ({max_page_size})"),
        ));
    }

    let prefixes = build_prefix_table(api.prefixes)?;

    let mut variables = match base.as_ref() {
        Some(base) => Bindings::with_resolver(Arc::new(BaseUriResolver::new(base.clone()))),
        None => Bindings::with_resolver(Arc::new(NoBaseUri)),
    };
    for (name, raw) in api.variables {
        variables.put(name, expand_resource_shortname(raw.into_value()?, &prefixes));
    }

    let endpoints = api
        .endpoints
        .into_iter()
        .map(|endpoint| endpoint.into_spec(default_page_size, max_page_size))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiSettings {
        base,
        default_page_size,
        max_page_size,
        prefixes,
        variables,
        endpoints,
    })
}

/// Resource defaults may be written as shortnames; store the URI they stand for.
fn expand_resource_shortname(value: Value, prefixes: &PrefixTable) -> Value {
    if !value.is_resource() || !value.is_complete() {
        return value;
    }
    match prefixes.decode(value.value_string()) {
        Some(uri) => value.with_value_string(uri),
        None => value,
    }
}

fn build_prefix_table(prefixes: BTreeMap<String, String>) -> Result<PrefixTable, LoadError> {
    let mut table = PrefixTable::new();
    for (prefix, namespace) in prefixes {
        if !is_usable_prefix(&prefix) {
            return Err(LoadError::invalid(
                "api.prefixes",
                format!("`{prefix}` is reserved or contains `_`"),
            ));
        }
        table
            .insert(prefix, namespace)
            .map_err(|err| LoadError::invalid("api.prefixes", err.to_string()))?;
    }
    Ok(table)
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let policy = match cache.policy {
        Some(descriptor) => descriptor
            .parse::<CachePolicy>()
            .map_err(|err| LoadError::invalid("cache.policy", err.to_string()))?,
        None => CachePolicy::default(),
    };

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        policy,
    })
}

fn positive(value: usize, key: &'static str) -> Result<usize, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(value)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base: Option<String>,
    default_page_size: Option<usize>,
    max_page_size: Option<usize>,
    prefixes: BTreeMap<String, String>,
    variables: BTreeMap<String, RawVariable>,
    endpoints: Vec<RawEndpoint>,
}

/// A variable is either a bare lexical form or a table carrying a datatype
/// (`type`, where `resource` names the resource datatype) or a language.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawVariable {
    Plain(String),
    Tagged {
        value: String,
        #[serde(rename = "type")]
        datatype: Option<String>,
        lang: Option<String>,
    },
}

impl RawVariable {
    fn into_value(self) -> Result<Value, LoadError> {
        match self {
            RawVariable::Plain(lexical) => Ok(Value::plain(lexical)),
            RawVariable::Tagged {
                value,
                datatype: None,
                lang: None,
            } => Ok(Value::plain(value)),
            RawVariable::Tagged {
                value,
                datatype: Some(datatype),
                lang: None,
            } if datatype == RESOURCE_TYPE_ALIAS || datatype == RESOURCE_DATATYPE => {
                Ok(Value::resource(value))
            }
            RawVariable::Tagged {
                value,
                datatype: Some(datatype),
                lang: None,
            } => Ok(Value::typed(value, datatype)),
            RawVariable::Tagged {
                value,
                datatype: None,
                lang: Some(lang),
            } => Ok(Value::lang(value, lang)),
            RawVariable::Tagged { value, .. } => Err(LoadError::invalid(
                "api.variables",
                format!("variable with value `{value}` sets both `type` and `lang`"),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawEndpoint {
    name: String,
    select: String,
    page_size: Option<usize>,
    max_page_size: Option<usize>,
}

impl RawEndpoint {
    fn into_spec(
        self,
        default_page_size: usize,
        max_page_size: usize,
    ) -> Result<EndpointSpec, LoadError> {
        if self.name.trim().is_empty() {
            return Err(LoadError::invalid(
                "api.endpoints",
                "endpoint name must not be empty",
            ));
        }
        let page_size = positive(
            self.page_size.unwrap_or(default_page_size),
            "api.endpoints.page_size",
        )?;
        let max = positive(
            self.max_page_size.unwrap_or(max_page_size),
            "api.endpoints.max_page_size",
        )?;
        Ok(EndpointSpec::new(self.name, self.select).with_page_sizes(page_size.min(max), max))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    policy: Option<String>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
