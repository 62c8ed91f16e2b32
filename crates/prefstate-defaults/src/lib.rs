#![doc = include_str!("../README.md")]

use chrono::{DateTime, Utc};
use prefstate::v1::{ConvergeError, Document, EntryPath, Kind, Value};
use std::collections::HashMap;
use std::process::Command;

// ── Error ────────────────────────────────────────────────────────────

/// Errors from external verification.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("query tool exited with status {status}: {stderr}")]
    Tool { status: i32, stderr: String },

    #[error("cannot parse tool output as {kind}: {output:?}")]
    Parse { kind: Kind, output: String },

    #[error("no value at `{path}` in domain {domain}")]
    ValueNotFound { domain: String, path: String },

    /// The external tool's view disagrees with the in-memory result.
    /// Advisory: the converge outcome stands; the caller investigates.
    #[error("verification mismatch: expected {expected:?}, tool reports {actual:?}")]
    VerificationMismatch { expected: Value, actual: Value },

    #[error(transparent)]
    Converge(#[from] ConvergeError),
}

pub type Result<T> = std::result::Result<T, ToolError>;

// ── Trait ────────────────────────────────────────────────────────────

/// An independent way to read a value back out of a persisted document.
///
/// `expected` tells the tool which kind to parse its (usually textual)
/// output as; it does not influence *what* is read.
pub trait QueryTool {
    fn read(&self, domain: &str, path: &EntryPath, expected: Kind) -> Result<Value>;
}

/// Compare what the external tool sees against `expected`, using the same
/// type-aware equality the engine uses.
///
/// Agreement is `Ok(())`; disagreement is
/// [`ToolError::VerificationMismatch`] carrying both values. This is a
/// cross-check, not a trigger: callers report the mismatch and must not
/// re-run convergence off the back of it.
pub fn verify(
    tool: &dyn QueryTool,
    domain: &str,
    path: &EntryPath,
    expected: &Value,
) -> Result<()> {
    let actual = tool.read(domain, path, expected.kind())?;
    if actual == *expected {
        Ok(())
    } else {
        Err(ToolError::VerificationMismatch {
            expected: expected.clone(),
            actual,
        })
    }
}

// ── Command-line tool ────────────────────────────────────────────────

/// Shells out to a query command, appending the domain and the colon-form
/// entry path as the final two arguments.
///
/// ```no_run
/// use prefstate_defaults::CommandQueryTool;
///
/// // Runs: plistbuddy-read <domain-file> <entry-path>
/// let tool = CommandQueryTool::new("plistbuddy-read");
/// ```
#[derive(Debug, Clone)]
pub struct CommandQueryTool {
    program: String,
    args: Vec<String>,
}

impl CommandQueryTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a fixed leading argument (before domain and path).
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl QueryTool for CommandQueryTool {
    fn read(&self, domain: &str, path: &EntryPath, expected: Kind) -> Result<Value> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(domain)
            .arg(path.to_string())
            .output()?;

        if !output.status.success() {
            return Err(ToolError::Tool {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_output(expected, stdout.trim())
    }
}

/// Parse a tool's textual output as a value of the given kind.
///
/// Booleans accept the spellings common across such tools (`1`/`0`,
/// `true`/`false`, `YES`/`NO`); `Data` is hex; containers are expected as
/// the externally tagged JSON form.
pub fn parse_output(kind: Kind, text: &str) -> Result<Value> {
    let parse_err = || ToolError::Parse {
        kind,
        output: text.to_string(),
    };
    match kind {
        Kind::Int => text.parse::<i64>().map(Value::Int).map_err(|_| parse_err()),
        Kind::Real => text.parse::<f64>().map(Value::Real).map_err(|_| parse_err()),
        Kind::Bool => match text {
            "1" | "true" | "YES" => Ok(Value::Bool(true)),
            "0" | "false" | "NO" => Ok(Value::Bool(false)),
            _ => Err(parse_err()),
        },
        Kind::String => Ok(Value::string(text)),
        Kind::Date => text
            .parse::<DateTime<Utc>>()
            .map(Value::Date)
            .map_err(|_| parse_err()),
        Kind::Data => decode_hex(text).map(Value::Data).ok_or_else(parse_err),
        Kind::Dict | Kind::Array => {
            let value: Value = serde_json::from_str(text).map_err(|_| parse_err())?;
            if value.kind() == kind {
                Ok(value)
            } else {
                Err(parse_err())
            }
        }
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

// ── In-memory stub ───────────────────────────────────────────────────

/// Answers queries from in-memory documents — the test double for
/// [`QueryTool`], so verification paths run without spawning a process.
#[derive(Debug, Clone, Default)]
pub struct StaticQueryTool {
    docs: HashMap<String, Document>,
}

impl StaticQueryTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, domain: impl Into<String>, doc: Document) -> Self {
        self.docs.insert(domain.into(), doc);
        self
    }
}

impl QueryTool for StaticQueryTool {
    fn read(&self, domain: &str, path: &EntryPath, _expected: Kind) -> Result<Value> {
        let doc = self
            .docs
            .get(domain)
            .ok_or_else(|| ToolError::ValueNotFound {
                domain: domain.to_string(),
                path: path.to_string(),
            })?;
        doc.get(path)?
            .cloned()
            .ok_or_else(|| ToolError::ValueNotFound {
                domain: domain.to_string(),
                path: path.to_string(),
            })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn weekday_doc() -> Document {
        let mut doc = Document::new();
        doc.root.insert(
            "AppleFirstWeekday".into(),
            Value::dict([("gregorian", Value::Int(4))]),
        );
        doc
    }

    fn weekday_path() -> EntryPath {
        EntryPath::parse("AppleFirstWeekday:gregorian").unwrap()
    }

    #[test]
    fn test_verify_agreement() {
        let tool = StaticQueryTool::new().with_document("com.example.calendar", weekday_doc());
        verify(&tool, "com.example.calendar", &weekday_path(), &Value::Int(4)).unwrap();
    }

    #[test]
    fn test_verify_mismatch_reports_both_values() {
        let tool = StaticQueryTool::new().with_document("com.example.calendar", weekday_doc());
        let err = verify(&tool, "com.example.calendar", &weekday_path(), &Value::Int(5))
            .unwrap_err();
        match err {
            ToolError::VerificationMismatch { expected, actual } => {
                assert_eq!(expected, Value::Int(5));
                assert_eq!(actual, Value::Int(4));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_verify_kind_mismatch() {
        // Tool holds Int(4); declaration expects Real(4.0). Type-aware
        // equality makes this a mismatch even though the numbers agree.
        let tool = StaticQueryTool::new().with_document("com.example.calendar", weekday_doc());
        let err = verify(
            &tool,
            "com.example.calendar",
            &weekday_path(),
            &Value::Real(4.0),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::VerificationMismatch { .. }));
    }

    #[test]
    fn test_verify_absent_value() {
        let tool = StaticQueryTool::new().with_document("com.example.calendar", weekday_doc());
        let err = verify(
            &tool,
            "com.example.calendar",
            &EntryPath::parse("Missing").unwrap(),
            &Value::Int(1),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::ValueNotFound { .. }));
    }

    #[test]
    fn test_verify_unknown_domain() {
        let tool = StaticQueryTool::new();
        let err = verify(&tool, "com.nope", &weekday_path(), &Value::Int(4)).unwrap_err();
        assert!(matches!(err, ToolError::ValueNotFound { .. }));
    }

    #[test]
    fn test_parse_output_int() {
        assert_eq!(parse_output(Kind::Int, "4").unwrap(), Value::Int(4));
        assert!(matches!(
            parse_output(Kind::Int, "four"),
            Err(ToolError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_output_real_vs_int() {
        assert_eq!(parse_output(Kind::Real, "4").unwrap(), Value::Real(4.0));
        assert_ne!(parse_output(Kind::Real, "4").unwrap(), Value::Int(4));
    }

    #[test]
    fn test_parse_output_bool_spellings() {
        for s in ["1", "true", "YES"] {
            assert_eq!(parse_output(Kind::Bool, s).unwrap(), Value::Bool(true));
        }
        for s in ["0", "false", "NO"] {
            assert_eq!(parse_output(Kind::Bool, s).unwrap(), Value::Bool(false));
        }
        assert!(parse_output(Kind::Bool, "yep").is_err());
    }

    #[test]
    fn test_parse_output_data_hex() {
        assert_eq!(
            parse_output(Kind::Data, "00ff10").unwrap(),
            Value::data(vec![0x00, 0xff, 0x10])
        );
        assert!(parse_output(Kind::Data, "0g").is_err());
        assert!(parse_output(Kind::Data, "fff").is_err());
    }

    #[test]
    fn test_parse_output_date() {
        let v = parse_output(Kind::Date, "2026-01-29T10:00:00Z").unwrap();
        assert_eq!(v.kind(), Kind::Date);
    }

    #[test]
    fn test_parse_output_container_json() {
        let v = parse_output(Kind::Dict, r#"{"Dict":{"gregorian":{"Int":4}}}"#).unwrap();
        assert_eq!(v, Value::dict([("gregorian", Value::Int(4))]));

        // Tag says Array but a Dict was expected.
        assert!(parse_output(Kind::Dict, r#"{"Array":[]}"#).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_tool_runs_and_parses() {
        // `echo 4` ignores the domain/path arguments we append; good enough
        // to exercise spawn, capture, and parse.
        let tool = CommandQueryTool::new("echo").with_arg("4");
        let v = tool.read("com.example", &weekday_path(), Kind::Int);
        // Output is "4 com.example AppleFirstWeekday:gregorian", which does
        // not parse as Int — the parse error path.
        assert!(matches!(v, Err(ToolError::Parse { .. })));

        let tool = CommandQueryTool::new("echo").with_arg("ignored");
        let v = tool.read("com.example", &weekday_path(), Kind::String).unwrap();
        assert_eq!(v.kind(), Kind::String);
    }

    #[test]
    fn test_end_to_end_converge_persist_query() {
        use prefstate_store::{DomainResolver, Store};

        // Mirrors the full scenario: no document on disk, converge the
        // declaration, then answer the query from an independently reloaded
        // copy of what was persisted.
        let temp = tempfile::TempDir::new().unwrap();
        let store = Store::with_resolver(DomainResolver::new().with_root(temp.path()));

        let outcome = store
            .converge("com.example.calendar", &weekday_path(), Value::Int(4))
            .unwrap();
        assert!(outcome.changed);

        let reloaded = store.load("com.example.calendar").unwrap();
        let tool = StaticQueryTool::new().with_document("com.example.calendar", reloaded);

        let seen = tool
            .read("com.example.calendar", &weekday_path(), Kind::Int)
            .unwrap();
        assert_eq!(seen, Value::Int(4));
        verify(&tool, "com.example.calendar", &weekday_path(), &Value::Int(4)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_command_tool_failure_status() {
        let tool = CommandQueryTool::new("false");
        let err = tool
            .read("com.example", &weekday_path(), Kind::Int)
            .unwrap_err();
        assert!(matches!(err, ToolError::Tool { .. }));
    }
}
