use crate::error::{Result, StoreError};
use prefstate::v1::{Document, Value};

/// Bytes-to-document boundary.
///
/// The store never looks inside the on-disk bytes itself; everything
/// format-specific happens behind this trait, so a binary property-list
/// codec (or anything else) can be injected without touching the engine.
pub trait Codec {
    /// Decode on-disk bytes into a document.
    fn decode(&self, bytes: &[u8]) -> Result<Document>;

    /// Encode a document back to its on-disk bytes.
    fn encode(&self, doc: &Document) -> Result<Vec<u8>>;

    /// File extension for documents in this format, without the dot.
    fn extension(&self) -> &str;
}

/// JSON codec using the externally tagged value representation.
///
/// The tag keeps `Int` and `Real` distinct on disk, which the engine's
/// type-aware comparison depends on:
///
/// ```json
/// { "AppleFirstWeekday": { "Dict": { "gregorian": { "Int": 4 } } } }
/// ```
#[derive(Debug, Clone)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Pretty-printed output — documents on disk stay diffable.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Document> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn encode(&self, doc: &Document) -> Result<Vec<u8>> {
        for (key, value) in &doc.root {
            check_reals_finite(key, value)?;
        }
        let out = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        out.map_err(|e| StoreError::Encode(e.to_string()))
    }

    fn extension(&self) -> &str {
        "json"
    }
}

/// serde_json renders NaN and the infinities as `null` without reporting an
/// error, and `null` then fails to decode as a real on the next load. Reject
/// them before any bytes are produced, so the file on disk stays decodable.
fn check_reals_finite(at: &str, value: &Value) -> Result<()> {
    match value {
        Value::Real(r) if !r.is_finite() => Err(StoreError::Encode(format!(
            "non-finite real under `{at}` has no JSON representation"
        ))),
        Value::Dict(map) => {
            for (key, v) in map {
                check_reals_finite(key, v)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for v in items {
                check_reals_finite(at, v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
