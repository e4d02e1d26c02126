//! Word-vector service client

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use w2v_common::{Result, VectorError};

pub mod http;

pub use http::HttpVectorClient;

/// Words to convert: one word, or an ordered list that is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Words {
    Single(String),
    List(WordList),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList(Vec<String>);

impl WordList {
    pub fn new(words: Vec<String>) -> Result<Self> {
        if words.is_empty() {
            return Err(VectorError::InvalidInput("word list is empty".into()));
        }
        Ok(Self(words))
    }

    pub fn as_slice(&self) -> &[String] { &self.0 }
}

impl Words {
    pub fn single(word: impl Into<String>) -> Self {
        Words::Single(word.into())
    }

    pub fn list<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).collect();
        Ok(Words::List(WordList::new(words)?))
    }

    /// `count` copies of `word`, as sent by the batched benchmark phase.
    pub fn repeated(word: &str, count: usize) -> Result<Self> {
        Self::list(std::iter::repeat(word).take(count))
    }

    /// Accepts a JSON string or a non-empty array of strings.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::String(word) => Ok(Words::single(word.as_str())),
            Value::Array(items) => {
                let mut words = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    match item {
                        Value::String(word) => words.push(word.clone()),
                        other => {
                            return Err(VectorError::InvalidInput(format!(
                                "element {} is {}, expected a string",
                                idx,
                                json_kind(other)
                            )))
                        }
                    }
                }
                Words::list(words)
            }
            other => Err(VectorError::InvalidInput(format!(
                "expected a string or a list of strings, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Normalised view: a single word is a one-element slice.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Words::Single(word) => std::slice::from_ref(word),
            Words::List(list) => list.as_slice(),
        }
    }

    pub fn len(&self) -> usize { self.as_slice().len() }

    /// Always false: a list cannot be built empty.
    pub fn is_empty(&self) -> bool { false }

    pub fn payload(&self) -> ConvertPayload<'_> {
        ConvertPayload { words: self.as_slice() }
    }
}

impl From<&str> for Words {
    fn from(word: &str) -> Self { Words::single(word) }
}

impl From<String> for Words {
    fn from(word: String) -> Self { Words::Single(word) }
}

impl TryFrom<Vec<String>> for Words {
    type Error = VectorError;

    fn try_from(words: Vec<String>) -> Result<Self> {
        Ok(Words::List(WordList::new(words)?))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Request body of the `/convert/` endpoint.
#[derive(Debug, Serialize)]
pub struct ConvertPayload<'a> {
    pub words: &'a [String],
}

/// Anything that can turn words into the service's JSON reply.
pub trait VectorService: Send + Sync {
    fn get_vector(&self, words: &Words) -> impl Future<Output = Result<Value>> + Send;
}

#[cfg(feature = "mock")]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory service that records every call and answers with a fixed value.
    pub struct RecordingService {
        calls: Mutex<Vec<Vec<String>>>,
        reply: Value,
    }

    impl Default for RecordingService {
        fn default() -> Self { Self::new(Value::Null) }
    }

    impl RecordingService {
        pub fn new(reply: Value) -> Self {
            Self { calls: Mutex::new(Vec::new()), reply }
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap_or_else(|p| p.into_inner()).len()
        }
    }

    impl VectorService for RecordingService {
        async fn get_vector(&self, words: &Words) -> Result<Value> {
            self.calls
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(words.as_slice().to_vec());
            Ok(self.reply.clone())
        }
    }
}
