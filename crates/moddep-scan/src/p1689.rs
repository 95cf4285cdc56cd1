//! P1689 report parsing and serialization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use moddep_core::{ModuleReference, SourceDependencyInfo};

use crate::error::{ParseError, ReportError};

/// Format version written into reports.
pub const FORMAT_VERSION: u64 = 0;

/// Format revision written into reports.
pub const FORMAT_REVISION: u64 = 0;

/// Highest report version this reader understands.
const MAX_SUPPORTED_VERSION: u64 = 1;

type Object = Map<String, Value>;

/// Parse a scanner report into the facts of its single translation unit.
pub fn parse(report_text: &str) -> Result<SourceDependencyInfo, ParseError> {
    let doc: Value = serde_json::from_str(report_text)
        .map_err(|e| ParseError::new(format!("invalid JSON: {e}")))?;

    let root = doc
        .as_object()
        .ok_or_else(|| ParseError::new("top-level value is not an object"))?;

    check_version(root)?;

    let rules = match root.get("rules") {
        Some(Value::Array(rules)) => rules,
        Some(_) => return Err(ParseError::new("'rules' is not an array")),
        None => return Err(ParseError::new("missing 'rules' array")),
    };
    if rules.len() != 1 {
        return Err(ParseError::new(format!(
            "expected 1 source entry, found {}",
            rules.len()
        )));
    }

    let rule = rules[0]
        .as_object()
        .ok_or_else(|| ParseError::new("rule is not an object"))?;
    parse_rule(rule)
}

/// Read and parse a report file.
pub fn parse_file(path: &Path) -> Result<SourceDependencyInfo, ReportError> {
    let text = fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let info = parse(&text).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        report = %path.display(),
        output = %info.primary_output.display(),
        provides = info.provides.len(),
        requires = info.requires.len(),
        "parsed dependency report"
    );
    Ok(info)
}

/// Render a report recording `info` for the unit compiled from
/// `original_scanner_input`, as if written to `output_path` from
/// `work_directory`.
pub fn render(
    work_directory: &Path,
    output_path: &Path,
    original_scanner_input: &Path,
    info: &SourceDependencyInfo,
) -> String {
    let rule = json!({
        "work-directory": path_value(work_directory),
        "inputs": [path_value(original_scanner_input)],
        "outputs": [path_value(output_path)],
        "depends": info.includes.iter().map(|p| path_value(p)).collect::<Vec<_>>(),
        "primary-output": path_value(&info.primary_output),
        "provides": info.provides.iter().map(reference_value).collect::<Vec<_>>(),
        "requires": info.requires.iter().map(reference_value).collect::<Vec<_>>(),
    });

    let doc = json!({
        "version": FORMAT_VERSION,
        "revision": FORMAT_REVISION,
        "rules": [rule],
    });

    // Serializing a `Value` cannot fail.
    let mut text = serde_json::to_string_pretty(&doc).unwrap_or_default();
    text.push('\n');
    text
}

/// Write a report for `info` to `output_path`, creating or replacing it.
///
/// The report records the scanner input it was derived from so the file can
/// be audited on its own.
pub fn write(
    output_path: &Path,
    original_scanner_input: &Path,
    info: &SourceDependencyInfo,
) -> io::Result<()> {
    let work_directory = std::env::current_dir()?;
    let text = render(&work_directory, output_path, original_scanner_input, info);
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, text)?;
    tracing::debug!(report = %output_path.display(), "wrote dependency report");
    Ok(())
}

fn check_version(root: &Object) -> Result<(), ParseError> {
    match root.get("version") {
        None => Ok(()),
        Some(v) => match v.as_u64() {
            Some(version) if version <= MAX_SUPPORTED_VERSION => Ok(()),
            _ => Err(ParseError::new(format!("unsupported version {v}"))),
        },
    }
}

fn parse_rule(rule: &Object) -> Result<SourceDependencyInfo, ParseError> {
    let work_directory = match rule.get("work-directory") {
        None => None,
        Some(Value::String(dir)) => Some(PathBuf::from(dir)),
        Some(_) => return Err(ParseError::new("work-directory is not a string")),
    };
    let work_directory = work_directory.as_deref();

    let includes = match rule.get("depends") {
        None => Vec::new(),
        Some(Value::Array(depends)) => depends
            .iter()
            .map(|d| parse_path(d, "depends entry", work_directory))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ParseError::new("'depends' is not an array")),
    };

    let primary_output = rule
        .get("primary-output")
        .map(|v| parse_path(v, "primary-output", work_directory))
        .transpose()?;

    // Older scanners nest the module facts under `future-compile`, whose
    // first output takes precedence over `primary-output`.
    let (primary_output, module_facts) = match rule.get("future-compile") {
        Some(Value::Object(future)) => {
            let first_output = match future.get("outputs") {
                Some(Value::Array(outputs)) => match outputs.first() {
                    Some(first) => Some(parse_path(first, "output", work_directory)?),
                    None => return Err(ParseError::new("expected at least one output")),
                },
                Some(_) => return Err(ParseError::new("'outputs' is not an array")),
                None => None,
            };
            (first_output.or(primary_output), future)
        }
        Some(_) => return Err(ParseError::new("'future-compile' is not an object")),
        None => (primary_output, rule),
    };

    let primary_output =
        primary_output.ok_or_else(|| ParseError::new("rule has no primary output"))?;

    let provides = parse_references(module_facts, "provides", work_directory)?;
    let requires = parse_references(module_facts, "requires", work_directory)?;

    Ok(SourceDependencyInfo {
        primary_output,
        provides,
        requires,
        includes,
    })
}

fn parse_references(
    container: &Object,
    key: &str,
    work_directory: Option<&Path>,
) -> Result<Vec<ModuleReference>, ParseError> {
    let entries = match container.get(key) {
        None => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(ParseError::new(format!("'{key}' is not an array"))),
    };

    entries
        .iter()
        .map(|entry| {
            let entry = entry
                .as_object()
                .ok_or_else(|| ParseError::new(format!("'{key}' entry is not an object")))?;

            let logical_name = match entry.get("logical-name") {
                Some(Value::String(name)) if !name.is_empty() => name.clone(),
                Some(Value::String(_)) => {
                    return Err(ParseError::new(format!(
                        "'{key}' entry has an empty logical-name"
                    )))
                }
                Some(_) => {
                    return Err(ParseError::new(format!(
                        "'{key}' entry has a non-string logical-name"
                    )))
                }
                None => {
                    return Err(ParseError::new(format!("'{key}' entry lacks logical-name")))
                }
            };

            let compiled_artifact_path = entry
                .get("compiled-module-path")
                .map(|p| parse_path(p, "compiled-module-path", work_directory))
                .transpose()?;

            Ok(ModuleReference {
                logical_name,
                compiled_artifact_path,
            })
        })
        .collect()
}

fn parse_path(
    value: &Value,
    what: &str,
    work_directory: Option<&Path>,
) -> Result<PathBuf, ParseError> {
    let raw = match value {
        Value::String(s) if !s.is_empty() => s,
        Value::String(_) => return Err(ParseError::new(format!("invalid filename: empty {what}"))),
        _ => return Err(ParseError::new(format!("invalid filename: {what} is not a string"))),
    };

    let path = PathBuf::from(raw);
    Ok(match work_directory {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path,
    })
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn reference_value(reference: &ModuleReference) -> Value {
    let mut obj = Map::new();
    obj.insert(
        "logical-name".to_string(),
        Value::String(reference.logical_name.clone()),
    );
    if let Some(path) = &reference.compiled_artifact_path {
        obj.insert("compiled-module-path".to_string(), path_value(path));
    }
    Value::Object(obj)
}
