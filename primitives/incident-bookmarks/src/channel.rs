//! Channel payload decoding.
//!
//! The chat platform passes the channel as the sole argument:
//!
//! ```json
//! {"Channel": {"ID": "C024BE91L", "Name": "inc_1234"}}
//! ```
//!
//! Keys match regardless of case, so `"channel"` or `"Id"` are accepted too.
//! The incident number is the trailing `_`-separated segment of the name.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// Top-level command-line payload.
#[derive(Debug, Deserialize)]
pub struct ChannelInput {
    #[serde(rename = "channel")]
    pub channel: ChannelRef,
}

/// The chat channel a run was invoked for.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRef {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "name")]
    pub name: String,
}

impl ChannelInput {
    /// Decodes the raw JSON argument.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(raw).map_err(Error::Input)?;
        serde_json::from_value(fold_keys(value)).map_err(Error::Input)
    }
}

/// Lowercases every object key; a later key wins over an earlier one that
/// folds to the same spelling.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), fold_keys(v)))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

impl ChannelRef {
    /// Extracts the incident number from the last `_` segment of the name.
    pub fn incident_number(&self) -> Result<i64, Error> {
        // rsplit always yields at least one item
        let segment = self.name.rsplit('_').next().unwrap_or_default();

        segment.parse().map_err(|_| Error::ChannelName {
            name: self.name.clone(),
        })
    }
}
