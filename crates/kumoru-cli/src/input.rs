//! Turning command-line values into request fields.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use kumoru_sdk::application::Certificates;
use serde_json::{Map, Value};

use crate::error::CliError;

fn split_pair<'a>(value: &'a str, what: &str) -> Result<(&'a str, &'a str), CliError> {
    value
        .split_once('=')
        .ok_or_else(|| CliError::InvalidArgument(format!("{what} must look like KEY=VALUE, got {value:?}")))
}

/// Parses `tag=weight` rules.
///
/// # Errors
///
/// Fails when a rule has no `=` or its weight is not an integer.
pub fn parse_rules(rules: &[String]) -> Result<BTreeMap<String, i32>, CliError> {
    rules
        .iter()
        .map(|rule| {
            let (tag, weight) = split_pair(rule, "rule")?;
            let weight = weight.trim().parse::<i32>().map_err(|_| {
                CliError::InvalidArgument(format!("rule weight must be an integer, got {weight:?}"))
            })?;
            Ok((tag.to_string(), weight))
        })
        .collect()
}

/// Parses `KEY=VALUE` pairs, splitting on the first `=` only.
///
/// # Errors
///
/// Fails when a pair has no `=`.
pub fn parse_env(vars: &[String]) -> Result<BTreeMap<String, String>, CliError> {
    vars.iter()
        .map(|var| {
            let (key, value) = split_pair(var, "environment variable")?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Reads one `KEY=VALUE` per line, skipping blank lines.
///
/// # Errors
///
/// Fails when the file cannot be read.
pub fn read_env_file(path: &Path) -> Result<Vec<String>, CliError> {
    let contents = read_file(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// The environment for an application: the env file when given, otherwise
/// the `-e` values.
///
/// # Errors
///
/// Fails when the file cannot be read or a line is malformed.
pub fn environment(env_file: Option<&Path>, vars: &[String]) -> Result<BTreeMap<String, String>, CliError> {
    match env_file {
        Some(path) => parse_env(&read_env_file(path)?),
        None => parse_env(vars),
    }
}

/// Metadata from an optional JSON object, with `labels` defaulting to an
/// empty list and replaced by `labels` when any are given.
///
/// # Errors
///
/// Fails when `metadata` is not a JSON object.
pub fn metadata(metadata: Option<&str>, labels: &[String]) -> Result<BTreeMap<String, Value>, CliError> {
    let mut object = match metadata {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(CliError::InvalidArgument("metadata must be a JSON object".into())),
            Err(e) => return Err(CliError::InvalidArgument(format!("metadata must be valid JSON: {e}"))),
        },
        None => Map::new(),
    };

    if labels.is_empty() {
        object.entry("labels").or_insert_with(|| Value::Array(Vec::new()));
    } else {
        let labels = labels.iter().cloned().map(Value::String).collect();
        object.insert("labels".into(), Value::Array(labels));
    }

    Ok(object.into_iter().collect())
}

/// Reads the certificate files that were given, verbatim.
///
/// # Errors
///
/// Fails when a given file cannot be read.
pub fn read_certificates(
    certificate: Option<&Path>,
    certificate_chain: Option<&Path>,
    private_key: Option<&Path>,
) -> Result<Certificates, CliError> {
    let read = |path: Option<&Path>| path.map(read_file).transpose().map(Option::unwrap_or_default);
    Ok(Certificates {
        certificate: read(certificate)?,
        certificate_chain: read(certificate_chain)?,
        private_key: read(private_key)?,
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|e| CliError::InvalidArgument(format!("could not read {}: {e}", path.display())))
}
