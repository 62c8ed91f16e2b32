use crate::value_arg::{ValueType, parse_value};
use anyhow::{Context, Result};
use prefstate::v1::EntryPath;
use prefstate_defaults::{CommandQueryTool, verify};

pub fn run(
    domain: &str,
    path: &str,
    value_type: ValueType,
    raw: &str,
    tool: &str,
    tool_args: &[String],
    pretty: bool,
) -> Result<()> {
    let entry = EntryPath::parse(path).with_context(|| format!("invalid entry path {path:?}"))?;
    let expected = parse_value(value_type, raw)?;

    let mut query = CommandQueryTool::new(tool);
    for arg in tool_args {
        query = query.with_arg(arg);
    }

    // A mismatch surfaces as an error; the persisted document is left
    // alone — verification never re-triggers convergence.
    verify(&query, domain, &entry, &expected)
        .with_context(|| format!("verification failed for {domain}:{path}"))?;

    let json = if pretty {
        serde_json::to_string_pretty(&expected)?
    } else {
        serde_json::to_string(&expected)?
    };
    println!("Verified: {}:{} = {}", domain, path, json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_verify_with_echo_string() {
        // `echo -n` is not portable; the trailing newline is trimmed by the
        // output parser, and String comparison sees the appended args too,
        // so expect the full echoed line.
        let result = run(
            "com.example",
            "k",
            ValueType::String,
            "hello com.example k",
            "echo",
            &["hello".to_string()],
            false,
        );
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_pretty_output() {
        let result = run(
            "com.example",
            "k",
            ValueType::String,
            "hello com.example k",
            "echo",
            &["hello".to_string()],
            true,
        );
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_mismatch_is_error() {
        let result = run(
            "com.example",
            "k",
            ValueType::String,
            "something else",
            "echo",
            &["hello".to_string()],
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_missing_tool() {
        let result = run(
            "com.example",
            "k",
            ValueType::Int,
            "4",
            "/nonexistent/query-tool",
            &[],
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_invalid_expected_value() {
        let result = run("com.example", "k", ValueType::Int, "four", "echo", &[], false);
        assert!(result.is_err());
    }
}
