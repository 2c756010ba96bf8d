use std::env;

use indexmap::IndexMap;

use super::types::Value;

/// Snapshot of environment entries, constructed explicitly and handed to the
/// functions that need it through the execution context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentStore {
    entries: IndexMap<String, String>,
}

impl EnvironmentStore {
    pub fn new() -> EnvironmentStore {
        EnvironmentStore { entries: IndexMap::new() }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> EnvironmentStore
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        EnvironmentStore { entries }
    }

    /// Captures the process environment once. With a `prefix`, only matching
    /// variables are kept and the prefix is stripped from their keys.
    pub fn from_process_env(prefix: Option<&str>) -> EnvironmentStore {
        let entries = env::vars()
            .filter_map(|(key, value)| match prefix {
                Some(prefix) => key
                    .strip_prefix(prefix)
                    .filter(|stripped| !stripped.is_empty())
                    .map(|stripped| (stripped.to_string(), value)),
                None => Some((key, value)),
            })
            .collect();
        EnvironmentStore { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    /// Entry as a template value, `Value::Null` when absent.
    pub fn get_value(&self, key: &str) -> Value {
        self.get(key).map(Value::string).unwrap_or(Value::Null)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
