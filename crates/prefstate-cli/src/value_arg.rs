use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use prefstate::v1::Value;

/// The `--type` flag: how the raw string argument should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    Int,
    Real,
    Bool,
    String,
    Date,
    /// Hex-encoded bytes
    Data,
    /// Externally tagged JSON, for container values
    Json,
}

/// Parse a command-line argument into a typed value.
pub fn parse_value(value_type: ValueType, raw: &str) -> Result<Value> {
    match value_type {
        ValueType::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .with_context(|| format!("not an integer: {raw:?}")),
        ValueType::Real => raw
            .parse::<f64>()
            .map(Value::Real)
            .with_context(|| format!("not a real: {raw:?}")),
        ValueType::Bool => match raw {
            "true" | "1" | "YES" => Ok(Value::Bool(true)),
            "false" | "0" | "NO" => Ok(Value::Bool(false)),
            _ => bail!("not a boolean: {raw:?}"),
        },
        ValueType::String => Ok(Value::string(raw)),
        ValueType::Date => raw
            .parse::<DateTime<Utc>>()
            .map(Value::Date)
            .with_context(|| format!("not an RFC 3339 date: {raw:?}")),
        ValueType::Data => parse_hex(raw)
            .map(Value::Data)
            .with_context(|| format!("not hex bytes: {raw:?}")),
        ValueType::Json => serde_json::from_str(raw)
            .with_context(|| format!("not a tagged JSON value: {raw:?}")),
    }
}

fn parse_hex(raw: &str) -> Result<Vec<u8>> {
    if raw.len() % 2 != 0 {
        bail!("odd-length hex string");
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| {
            let pair = raw.get(i..i + 2).context("hex string must be ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("bad hex at {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_value(ValueType::Int, "4").unwrap(), Value::Int(4));
        assert!(parse_value(ValueType::Int, "4.0").is_err());
    }

    #[test]
    fn test_parse_real_distinct_from_int() {
        let v = parse_value(ValueType::Real, "4").unwrap();
        assert_eq!(v, Value::Real(4.0));
        assert_ne!(v, Value::Int(4));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(
            parse_value(ValueType::Bool, "YES").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            parse_value(ValueType::Bool, "0").unwrap(),
            Value::Bool(false)
        );
        assert!(parse_value(ValueType::Bool, "maybe").is_err());
    }

    #[test]
    fn test_parse_string_verbatim() {
        assert_eq!(
            parse_value(ValueType::String, "4").unwrap(),
            Value::string("4")
        );
    }

    #[test]
    fn test_parse_date() {
        let v = parse_value(ValueType::Date, "2026-01-29T10:00:00Z").unwrap();
        assert!(matches!(v, Value::Date(_)));
        assert!(parse_value(ValueType::Date, "yesterday").is_err());
    }

    #[test]
    fn test_parse_data_hex() {
        assert_eq!(
            parse_value(ValueType::Data, "00ff").unwrap(),
            Value::data(vec![0x00, 0xff])
        );
        assert!(parse_value(ValueType::Data, "f").is_err());
        assert!(parse_value(ValueType::Data, "zz").is_err());
    }

    #[test]
    fn test_parse_json_container() {
        let v = parse_value(ValueType::Json, r#"{"Dict":{"gregorian":{"Int":4}}}"#).unwrap();
        assert_eq!(v, Value::dict([("gregorian", Value::Int(4))]));
        assert!(parse_value(ValueType::Json, "not json").is_err());
    }
}
