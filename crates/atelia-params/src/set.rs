//! Parsing and merging of parameter sets.

use std::collections::BTreeMap;

use crate::key::ParamKey;

/// A merged mapping of parameter key codes to values.
///
/// An entry may be present with no value: that is the explicit clear marker
/// produced by a token like `ar-`, and it removes the key when merged onto a
/// base set. Equality is structural over all entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSet {
    entries: BTreeMap<ParamKey, Option<String>>,
}

impl ParamSet {
    /// Tokenize `text` and collect every recognisable `code-value` token.
    ///
    /// Total: never fails. Unrecognised tokens are skipped; a recognised
    /// code whose value does not validate is skipped too (the key simply
    /// stays absent). The snippet key `s` greedily absorbs the following
    /// plain words up to the next recognised key token.
    pub fn parse(text: &str) -> ParamSet {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut entries = BTreeMap::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            i += 1;

            let Some((code, raw)) = token.split_once('-') else {
                continue;
            };
            let Some(key) = ParamKey::from_code(code) else {
                continue;
            };

            if key == ParamKey::S {
                if !raw.is_empty() && !ParamKey::S.validate(raw) {
                    continue;
                }
                let mut words: Vec<&str> = Vec::new();
                if !raw.is_empty() {
                    words.push(raw);
                }
                while i < tokens.len() && is_snippet_word(tokens[i]) {
                    words.push(tokens[i]);
                    i += 1;
                }
                let value = words.join(" ");
                entries.insert(key, (!value.is_empty()).then_some(value));
                continue;
            }

            if raw.is_empty() {
                // Explicit clear marker.
                entries.insert(key, None);
            } else if key.validate(raw) {
                entries.insert(key, Some(raw.to_string()));
            }
        }

        ParamSet { entries }
    }

    /// Apply `updates` on top of `self`.
    ///
    /// Valued entries overwrite, clear markers remove, everything else is
    /// untouched. Returns whether the result differs from the base, so
    /// callers can skip redundant persistence.
    pub fn merge(&self, updates: &ParamSet) -> (bool, ParamSet) {
        let mut entries = self.entries.clone();
        for (key, value) in &updates.entries {
            match value {
                Some(v) => {
                    entries.insert(*key, Some(v.clone()));
                },
                None => {
                    entries.remove(key);
                },
            }
        }
        let merged = ParamSet { entries };
        let changed = merged != *self;
        (changed, merged)
    }

    pub fn has(&self, key: ParamKey) -> bool {
        self.get(key).is_some()
    }

    /// Value for `key`, if set (clear markers read as absent).
    pub fn get(&self, key: ParamKey) -> Option<&str> {
        self.entries.get(&key).and_then(|v| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|v| v.is_none())
    }

    /// All keys that currently carry a value, in key order.
    pub fn iter_set(&self) -> impl Iterator<Item = (ParamKey, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
    }

    /// Serialize set values as a flat `code → value` JSON object for the
    /// external defaults store.
    pub fn to_stored(&self) -> String {
        let map: BTreeMap<&str, &str> = self.iter_set().map(|(k, v)| (k.code(), v)).collect();
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }

    /// Rebuild a set from a previously stored JSON object by reconstructing
    /// a token string and re-parsing it. Unknown codes and values that no
    /// longer validate fall out, same as live input.
    pub fn from_stored(raw: &str) -> ParamSet {
        let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(raw) else {
            return ParamSet::default();
        };
        let tokens: Vec<String> = map
            .iter()
            .map(|(code, value)| format!("{}-{value}", code.to_lowercase()))
            .collect();
        ParamSet::parse(&tokens.join(" "))
    }
}

/// A bare word that continues an `s-` snippet: alphanumeric and not itself a
/// recognised key token.
fn is_snippet_word(token: &str) -> bool {
    if let Some((code, _)) = token.split_once('-')
        && ParamKey::from_code(code).is_some()
    {
        return false;
    }
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphanumeric())
}
