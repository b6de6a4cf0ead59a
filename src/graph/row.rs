//! Result rows decoded from Bolt into JSON, and the parameter map sent back.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// `$name` bindings for a Cypher statement. Values are JSON here and become
/// Bolt values only inside a backend; maps are not accepted there.
pub type Params = HashMap<String, JsonValue>;

/// Rows of one statement. Transactional statements yield already-buffered rows.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// One result record, keyed by the aliases in the statement's RETURN clause.
///
/// Node timestamps arrive as epoch-nanosecond integers and tag sets as string
/// lists; [`Row::get`] deserializes either straight into the model types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Reads column `key` as `T`. A missing column or a value of the wrong
    /// shape is an [`AppError::Internal`], since the statement text fixes both.
    ///
    /// ```ignore
    /// let created: i64 = row.get("created_at")?;
    /// let tags: Vec<String> = row.get("tags")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    AppError::Internal(format!("failed to deserialize '{}': {}", key, e))
                })
            })
    }

    /// Like [`Row::get`], but a null (an unset property) or absent column is `None`.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
