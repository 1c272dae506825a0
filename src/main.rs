use std::process;

use lda::{
    bindings::{Bindings, QueryParams},
    cache::CacheController,
    config::{self, Command, Settings},
    infra::{error::InfraError, telemetry},
};
use serde_json::json;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_error(&error);
        process::exit(1);
    }
}

fn report_error(error: &InfraError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "command failed");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "command failed");
    });
}

fn run() -> Result<(), InfraError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Command::Expand(args) => {
            let params: QueryParams = args.params.into_iter().collect();
            let mut context = Bindings::create_context(&settings.api.variables, &params)?;
            println!("{}", context.expand_variables(&args.template)?);
        }
        Command::Encode(args) => {
            println!("{}", settings.api.prefixes.encode(&args.uri));
        }
        Command::Decode(args) => {
            let uri = settings
                .api
                .prefixes
                .decode(&args.token)
                .ok_or_else(|| InfraError::not_a_shortname(&args.token))?;
            println!("{uri}");
        }
        Command::Check => run_check(&settings)?,
    }

    Ok(())
}

fn run_check(settings: &Settings) -> Result<(), InfraError> {
    let cache = CacheController::new(settings.cache.policy);
    let report = json!({
        "api": {
            "base": settings.api.base.as_ref().map(|base| base.as_str()),
            "default_page_size": settings.api.default_page_size,
            "max_page_size": settings.api.max_page_size,
            "prefixes": settings.api.prefixes.iter().collect::<Vec<_>>(),
            "variables": settings.api.variables.keys(),
            "endpoints": settings
                .api
                .endpoints
                .iter()
                .map(|endpoint| endpoint.name.as_str())
                .collect::<Vec<_>>(),
        },
        "cache": {
            "enabled": settings.cache.enabled,
            "summary": cache.summary(),
        },
    });

    info!(
        endpoints = settings.api.endpoints.len(),
        "Configuration is valid"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
