//! Per-occurrence exceptions.
//!
//! An [`Exceptions`] map holds, per [`DateKey`], either a removal
//! tombstone or a sparse [`Exception::Patch`]. Scalar fields store the
//! replacement value; structured (object) fields store leaf-level
//! `(path, value)` diffs against the inherited value, so a change to one
//! attendee does not freeze the rest of the list.
//!
//! Paths use `/` between segments with `~0`/`~1` escaping for `~`/`/`
//! inside keys. The overlay is kept minimal: overrides equal to the
//! inherited value are pruned, empty patches are dropped and an empty map
//! collapses to `None`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::date_key::DateKey;
use crate::error::{Error, Result};

/// Field name for an occurrence's start.
pub const START_FIELD: &str = "start";

/// Field name for an occurrence's duration, in seconds.
pub const DURATION_FIELD: &str = "duration";

/// One leaf-level change inside a structured field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafDiff {
    /// Escaped path relative to the field.
    pub path: String,
    /// New leaf value; `None` deletes the leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// An override of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOverride {
    /// Replaces the field wholesale.
    Value(Value),
    /// Applies leaf diffs to the inherited structure.
    Diff(Vec<LeafDiff>),
}

impl FieldOverride {
    /// Builds the override that turns `inherited` into `new`, or `None`
    /// if they are already equal.
    pub fn between(inherited: &Value, new: &Value) -> Option<Self> {
        if inherited == new {
            return None;
        }
        match (inherited, new) {
            (Value::Object(old), Value::Object(new)) => {
                let mut diffs = Vec::new();
                diff_objects(old, new, "", &mut diffs);
                Some(Self::Diff(diffs))
            }
            _ => Some(Self::Value(new.clone())),
        }
    }

    /// Resolves the field's effective value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathThroughScalar`] if a diff path walks through a
    /// value that is not an object.
    pub fn resolve(&self, inherited: &Value) -> Result<Value> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Diff(diffs) => {
                let mut value = inherited.clone();
                for diff in diffs {
                    apply_leaf(&mut value, diff)?;
                }
                Ok(value)
            }
        }
    }
}

/// The overlay entry of one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Exception {
    /// The occurrence does not happen.
    Removed,
    /// The occurrence happens with some fields overridden.
    Patch { fields: BTreeMap<String, FieldOverride> },
}

impl Exception {
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }

    /// Returns the override of `field`, if any.
    pub fn field(&self, field: &str) -> Option<&FieldOverride> {
        match self {
            Self::Patch { fields } => fields.get(field),
            Self::Removed => None,
        }
    }

    /// True if the patch moves the occurrence in time.
    pub fn overrides_timing(&self) -> bool {
        self.field(START_FIELD).is_some() || self.field(DURATION_FIELD).is_some()
    }
}

/// Sparse overlay of an event's occurrences, ordered by date-key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Exceptions(BTreeMap<DateKey, Exception>);

impl Exceptions {
    pub fn get(&self, key: &DateKey) -> Option<&Exception> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &Exception)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits into the entries strictly before `key` and the rest.
    pub fn partition_at(self, key: &DateKey) -> (Option<Exceptions>, Option<Exceptions>) {
        let mut before = self.0;
        let after = before.split_off(key);
        (collapse(Exceptions(before)), collapse(Exceptions(after)))
    }

    /// Rebuilds the map with every key passed through `f`.
    pub fn rekey(self, mut f: impl FnMut(&DateKey) -> DateKey) -> Exceptions {
        Exceptions(self.0.into_iter().map(|(key, value)| (f(&key), value)).collect())
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&DateKey, &Exception) -> bool) {
        self.0.retain(|key, exception| keep(key, exception));
    }
}

impl FromIterator<(DateKey, Exception)> for Exceptions {
    fn from_iter<I: IntoIterator<Item = (DateKey, Exception)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn collapse(exceptions: Exceptions) -> Option<Exceptions> {
    (!exceptions.is_empty()).then_some(exceptions)
}

/// Sets `field` of occurrence `key` to `value`.
///
/// `inherited` is the value the occurrence would see without an override.
/// Setting a removed occurrence's field revives it as a patch.
pub fn apply(
    exceptions: &mut Option<Exceptions>,
    key: &DateKey,
    field: &str,
    inherited: &Value,
    value: &Value,
) {
    let map = exceptions.get_or_insert_with(Exceptions::default);
    let entry = map.0.entry(key.clone()).or_insert_with(|| Exception::Patch {
        fields: BTreeMap::new(),
    });
    if entry.is_removed() {
        *entry = Exception::Patch {
            fields: BTreeMap::new(),
        };
    }
    if let Exception::Patch { fields } = entry {
        match FieldOverride::between(inherited, value) {
            Some(patch) => {
                fields.insert(field.to_string(), patch);
            }
            None => {
                fields.remove(field);
            }
        }
    }
}

/// Marks occurrence `key` as removed, discarding any patch.
pub fn remove(exceptions: &mut Option<Exceptions>, key: &DateKey) {
    exceptions
        .get_or_insert_with(Exceptions::default)
        .0
        .insert(key.clone(), Exception::Removed);
}

/// Drops every override of occurrence `key`. Returns true if one existed.
pub fn restore(exceptions: &mut Option<Exceptions>, key: &DateKey) -> bool {
    let removed = exceptions
        .as_mut()
        .is_some_and(|map| map.0.remove(key).is_some());
    if exceptions.as_ref().is_some_and(Exceptions::is_empty) {
        *exceptions = None;
    }
    removed
}

/// Resolves `field` of occurrence `key`: the override if present, the
/// inherited value otherwise.
pub fn effective(
    exceptions: Option<&Exceptions>,
    key: &DateKey,
    field: &str,
    inherited: &Value,
) -> Result<Value> {
    match exceptions.and_then(|map| map.get(key)).and_then(|e| e.field(field)) {
        Some(patch) => patch.resolve(inherited),
        None => Ok(inherited.clone()),
    }
}

/// Removes no-op overrides, empty patches, and finally the map itself.
///
/// `inherited(key, field)` must return the freshly computed inherited
/// value. Tombstones are kept.
///
/// # Errors
///
/// Fails fast if a stored diff no longer fits its inherited value.
pub fn prune(
    exceptions: &mut Option<Exceptions>,
    inherited: impl Fn(&DateKey, &str) -> Value,
) -> Result<()> {
    let Some(map) = exceptions.as_mut() else {
        return Ok(());
    };
    for (key, exception) in map.0.iter_mut() {
        if let Exception::Patch { fields } = exception {
            let mut noop = Vec::new();
            for (field, patch) in fields.iter() {
                let base = inherited(key, field);
                if patch.resolve(&base)? == base {
                    noop.push(field.clone());
                }
            }
            for field in noop {
                fields.remove(&field);
            }
        }
    }
    map.0.retain(|_, exception| match exception {
        Exception::Patch { fields } => !fields.is_empty(),
        Exception::Removed => true,
    });
    if map.is_empty() {
        *exceptions = None;
    }
    Ok(())
}

/// Escapes one path segment.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Reverses [`escape_segment`].
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        escape_segment(key)
    } else {
        format!("{prefix}/{}", escape_segment(key))
    }
}

fn diff_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<LeafDiff>,
) {
    for (key, old_value) in old {
        let path = join(prefix, key);
        match new.get(key) {
            None => out.push(LeafDiff { path, value: None }),
            Some(new_value) if new_value == old_value => {}
            Some(Value::Object(new_inner)) => match old_value {
                Value::Object(old_inner) => diff_objects(old_inner, new_inner, &path, out),
                _ => out.push(LeafDiff {
                    path,
                    value: Some(Value::Object(new_inner.clone())),
                }),
            },
            Some(new_value) => out.push(LeafDiff {
                path,
                value: Some(new_value.clone()),
            }),
        }
    }
    for (key, new_value) in new {
        if !old.contains_key(key) {
            out.push(LeafDiff {
                path: join(prefix, key),
                value: Some(new_value.clone()),
            });
        }
    }
}

fn apply_leaf(root: &mut Value, diff: &LeafDiff) -> Result<()> {
    let segments: Vec<String> = diff.path.split('/').map(unescape_segment).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        let Value::Object(map) = current else {
            return Err(Error::path_through_scalar(&diff.path));
        };
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let Value::Object(map) = current else {
        return Err(Error::path_through_scalar(&diff.path));
    };
    match &diff.value {
        Some(value) => {
            map.insert(last.clone(), value.clone());
        }
        None => {
            map.remove(last);
        }
    }
    Ok(())
}
