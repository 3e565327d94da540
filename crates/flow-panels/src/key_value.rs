use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

/// Editable key/value list backing `input_map` style fields.
///
/// Never empty, and once the last row is filled in a fresh blank row is
/// appended so the user always has somewhere to type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueRows {
    rows: Vec<KeyValueRow>,
}

impl Default for KeyValueRows {
    fn default() -> Self {
        Self {
            rows: vec![KeyValueRow::default()],
        }
    }
}

impl KeyValueRows {
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let mut rows = Self {
            rows: map
                .iter()
                .map(|(key, value)| KeyValueRow {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        };
        rows.ensure_trailing_blank();
        rows
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrites row `index`. Out-of-range indexes are ignored.
    pub fn set(&mut self, index: usize, key: &str, value: &str) {
        let Some(row) = self.rows.get_mut(index) else {
            tracing::warn!(index, "Ignoring edit of missing key/value row");
            return;
        };
        row.key = key.to_string();
        row.value = value.to_string();
        self.ensure_trailing_blank();
    }

    pub fn push(&mut self) {
        self.rows.push(KeyValueRow::default());
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
        if self.rows.is_empty() {
            self.push();
        }
    }

    /// Rows with a non-blank key, trimmed. Later duplicates win.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.rows
            .iter()
            .filter(|row| !row.key.trim().is_empty())
            .map(|row| (row.key.trim().to_string(), row.value.trim().to_string()))
            .collect()
    }

    fn ensure_trailing_blank(&mut self) {
        if self.rows.last().is_none_or(|row| !row.is_blank()) {
            self.push();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_has_one_blank_row() {
        let rows = KeyValueRows::from_map(&BTreeMap::new());
        assert_eq!(rows.len(), 1);
        assert!(rows.to_map().is_empty());
    }

    #[test]
    fn test_filling_last_row_appends_blank() {
        let mut rows = KeyValueRows::default();
        rows.set(0, "query", "state.query");
        assert_eq!(rows.len(), 2);
        rows.set(0, "q", "state.q");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_remove_keeps_one_row() {
        let mut rows = KeyValueRows::default();
        rows.remove(0);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_blank_keys_are_skipped() {
        let mut rows = KeyValueRows::default();
        rows.set(0, " user ", " state.user ");
        rows.set(1, "", "orphan value");
        let map = rows.to_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("user").map(String::as_str), Some("state.user"));
    }
}
