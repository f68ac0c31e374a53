use std::collections::HashMap;

use super::value::Value;

/// Table key. Only numbers and strings can index a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Number(i64),
    Str(String),
}

impl Key {
    /// Converts a runtime value into a key, `None` for non-indexable values.
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::Number(n) => Some(Key::Number(*n)),
            Value::String(s) => Some(Key::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Number(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

/// Associative array from `Key` to `Value`.
///
/// Storing `nil` removes the key, so every present key maps to a non-nil
/// value and the border can be derived from the key set alone.
#[derive(Debug, Default)]
pub struct Table {
    entries: HashMap<Key, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`, or `nil`.
    pub fn get(&self, key: &Key) -> Value {
        self.entries.get(key).cloned().unwrap_or(Value::Nil)
    }

    pub fn set(&mut self, key: Key, value: Value) {
        if matches!(value, Value::Nil) {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    /// Smallest border: the largest `n` such that keys `1..=n` are all present.
    ///
    /// Sorts the positive integer keys and scans for the first gap, which is
    /// O(n log n) rather than the O(log n) search a border definition allows.
    pub fn border(&self) -> i64 {
        let mut keys: Vec<i64> = self
            .entries
            .keys()
            .filter_map(|k| match k {
                Key::Number(n) if *n > 0 => Some(*n),
                _ => None,
            })
            .collect();
        keys.sort_unstable();

        let mut border = 0;
        for k in keys {
            if k != border + 1 {
                break;
            }
            border = k;
        }
        border
    }

    /// Sorts the values at keys `1..=border` in ascending order, in place.
    /// Keys past the border are left untouched.
    ///
    /// Fails with the offending type names when two values in the sequence
    /// cannot be compared.
    pub fn sort_sequence(&mut self) -> Result<(), (&'static str, &'static str)> {
        let border = self.border();
        let mut values: Vec<Value> = (1..=border).map(|i| self.get(&Key::Number(i))).collect();

        if let Some(pair) = values
            .windows(2)
            .find(|w| w[0].compare(&w[1]).is_none())
        {
            return Err((pair[0].type_name(), pair[1].type_name()));
        }
        values.sort_by(|a, b| a.compare(b).unwrap_or(std::cmp::Ordering::Equal));

        for (i, value) in values.into_iter().enumerate() {
            self.set(Key::Number(i as i64 + 1), value);
        }
        Ok(())
    }
}
