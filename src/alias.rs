//! Maps user-entered coin symbols and names to price-provider ids.
//!
//! Lookup is total: inputs that are not in the table resolve to their own
//! normalized (trimmed, lowercased) form.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config;

/// Normalize a coin string the way every lookup does: trim, then lowercase.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Immutable alias table shared by every clone of the resolver.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    table: Arc<HashMap<String, String>>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(config::default_aliases())
    }
}

impl AliasResolver {
    /// Create a resolver over the given `alias -> canonical id` pairs.
    ///
    /// Alias keys are normalized on the way in so that a key such as
    /// `"BTC "` still matches lookups for `"btc"`.
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let table = aliases
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), v.into()))
            .collect();
        Self {
            table: Arc::new(table),
        }
    }

    /// Resolve `input` to a canonical provider id.
    pub fn resolve(&self, input: &str) -> String {
        let key = normalize(input);
        match self.table.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
