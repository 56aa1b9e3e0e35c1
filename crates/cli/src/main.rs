mod request_file;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use refetch_api::{ClientConfig, ReqwestTransport};
use refetch_engine::{FetchSession, SessionConfig};
use refetch_types::{HttpMethod, ResultTypeHint, TriggerArgs};
use refetch_util::redact_headers;
use serde_json::Value;
use tracing::debug;

use crate::request_file::RequestFile;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = build_cli().get_matches();
    run(&matches).await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new("refetch")
        .about("Resolve, send and decode a declarative HTTP request")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(Arg::new("url").action(ArgAction::Set).help("Request URL; overrides the URL in --file"))
        .arg(
            Arg::new("method")
                .long("request")
                .short('X')
                .action(ArgAction::Set)
                .value_parser(|raw: &str| raw.parse::<HttpMethod>().map_err(|error| error.to_string()))
                .help("HTTP method (GET, POST, PATCH, DELETE, PUT, HEAD)"),
        )
        .arg(
            Arg::new("param")
                .long("param")
                .short('p')
                .action(ArgAction::Append)
                .value_parser(parse_param)
                .help("Query parameter as key=value; repeatable"),
        )
        .arg(
            Arg::new("header")
                .long("header")
                .short('H')
                .action(ArgAction::Append)
                .value_parser(parse_header)
                .help("Request header as name:value; repeatable"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .short('d')
                .action(ArgAction::Set)
                .value_parser(|raw: &str| serde_json::from_str::<Value>(raw).map_err(|error| format!("body is not valid JSON: {error}")))
                .help("JSON request body; merged over the body in --file"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(PathBuf))
                .help("YAML or JSON request file used as the base request"),
        )
        .arg(
            Arg::new("result-type")
                .long("result-type")
                .action(ArgAction::Set)
                .value_parser(|raw: &str| raw.parse::<ResultTypeHint>())
                .help("Decoding for successful responses: json, text or infer"),
        )
        .arg(
            Arg::new("error-result-type")
                .long("error-result-type")
                .action(ArgAction::Set)
                .value_parser(|raw: &str| raw.parse::<ResultTypeHint>())
                .help("Decoding for error responses: json, text or infer"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64).range(1..))
                .help("Request timeout in seconds; overrides REFETCH_TIMEOUT_SECS"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the assembled request without sending it"),
        )
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let base = match matches.get_one::<PathBuf>("file") {
        Some(path) => {
            debug!(path = %path.display(), "loading request file");
            RequestFile::load(path)?
        }
        None => RequestFile::default(),
    };
    let config = session_config(base, matches)?;
    let overrides = trigger_args(matches);

    if config.request.url.is_none() && overrides.url.is_none() {
        bail!("no URL given; pass one as an argument or set `url` in --file");
    }

    let session = FetchSession::new(config).context("failed to create fetch session")?;

    if matches.get_flag("dry-run") {
        let prepared = session.prepare(&overrides)?;
        let out = serde_json::json!({
            "method": prepared.request.method,
            "url": prepared.request.url,
            "headers": redact_headers(&prepared.request.headers),
            "body": prepared.request.body,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let outcome = session.trigger(overrides).await?;
    println!("{}", serde_json::to_string_pretty(&session.state())?);
    if !outcome.is_success() {
        bail!("request settled with an error response");
    }
    Ok(())
}

/// Base configuration: the request file plus flags that only exist at
/// session level (decoding hints, transport settings).
fn session_config(base: RequestFile, matches: &ArgMatches) -> Result<SessionConfig> {
    let mut config = base.into_session_config();
    if let Some(hint) = matches.get_one::<ResultTypeHint>("result-type") {
        config.result_type = *hint;
    }
    if let Some(hint) = matches.get_one::<ResultTypeHint>("error-result-type") {
        config.error_result_type = *hint;
    }

    let mut client = ClientConfig::from_env();
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        client = client.with_timeout(Duration::from_secs(*seconds));
    }
    let transport = ReqwestTransport::new(client).context("failed to build HTTP client")?;
    Ok(config.transport(Arc::new(transport)))
}

/// Flag values become the trigger-time override layer.
fn trigger_args(matches: &ArgMatches) -> TriggerArgs {
    let mut args = TriggerArgs::new();
    if let Some(url) = matches.get_one::<String>("url") {
        args = args.url(url.clone());
    }
    if let Some(method) = matches.get_one::<HttpMethod>("method") {
        args = args.method(*method);
    }
    for (key, value) in matches.get_many::<(String, String)>("param").into_iter().flatten() {
        args = args.param(key.clone(), value.clone());
    }
    for (name, value) in matches.get_many::<(String, String)>("header").into_iter().flatten() {
        args = args.header(name.clone(), value.clone());
    }
    if let Some(body) = matches.get_one::<Value>("data") {
        args = args.body(body.clone());
    }
    args
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected name:value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use refetch_engine::{Transforms, resolve_request};
    use serde_json::json;

    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        build_cli()
            .try_get_matches_from(std::iter::once("refetch").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn params_and_headers_split_on_first_separator() {
        assert_eq!(parse_param("q=a=b"), Ok(("q".into(), "a=b".into())));
        assert_eq!(parse_header("Authorization: Bearer a:b"), Ok(("Authorization".into(), "Bearer a:b".into())));
        assert!(parse_param("novalue").is_err());
        assert!(parse_header(":empty").is_err());
    }

    #[test]
    fn flags_parse_into_trigger_args() {
        let matches = matches(&[
            "https://api.test/items",
            "-X",
            "post",
            "-p",
            "page=2",
            "-p",
            "q=apple",
            "-H",
            "accept: application/json",
            "-d",
            r#"{"name":"apple"}"#,
        ]);
        let args = trigger_args(&matches);
        let resolved = resolve_request(&Default::default(), &args, &Transforms::default()).expect("resolves");

        assert_eq!(resolved.url, "https://api.test/items");
        assert_eq!(resolved.method, HttpMethod::Post);
        assert_eq!(resolved.params, refetch_types::Params::from([
            ("page".to_string(), json!("2")),
            ("q".to_string(), json!("apple")),
        ]));
        assert_eq!(resolved.headers.get("accept").map(String::as_str), Some("application/json"));
        assert_eq!(resolved.body, Some(json!({"name": "apple"})));
    }

    #[test]
    fn invalid_method_and_body_are_rejected() {
        assert!(build_cli().try_get_matches_from(["refetch", "-X", "FETCH"]).is_err());
        assert!(build_cli().try_get_matches_from(["refetch", "-d", "{oops"]).is_err());
        assert!(build_cli().try_get_matches_from(["refetch", "--result-type", "xml"]).is_err());
    }

    #[test]
    fn flags_layer_over_request_file() {
        let file = RequestFile {
            url: Some("https://api.test/items".into()),
            method: Some(HttpMethod::Put),
            params: refetch_types::Params::from([("page".to_string(), json!(1)), ("size".to_string(), json!(10))]),
            body: Some(json!({"name": "apple", "qty": 1})),
            ..RequestFile::default()
        };
        let matches = matches(&["-p", "page=3", "-d", r#"{"qty":5}"#, "--result-type", "text"]);
        let config = session_config(file, &matches).expect("config builds");
        let resolved = resolve_request(&config.request, &trigger_args(&matches), &Transforms::default()).expect("resolves");

        assert_eq!(config.result_type, ResultTypeHint::Text);
        assert_eq!(resolved.url, "https://api.test/items");
        assert_eq!(resolved.method, HttpMethod::Put);
        assert_eq!(resolved.params.get("page"), Some(&json!("3")));
        assert_eq!(resolved.params.get("size"), Some(&json!(10)));
        assert_eq!(resolved.body, Some(json!({"name": "apple", "qty": 5})));
    }
}
