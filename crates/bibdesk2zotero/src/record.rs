//! Bibliography record being migrated.

use bibdesk_bibtex::{BibTeXEntry, BibTeXEntryType, BibTeXField};

/// One bibliography entry.
///
/// `id` and `entry_type` are the citation key and entry type. Every other
/// field lives in `fields`, which keeps insertion order and holds at most one
/// value per name. Names are case-sensitive: `file` and `File` are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub entry_type: String,
    fields: Vec<BibTeXField>,
}

impl Record {
    pub fn new(id: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_type: entry_type.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style `set`.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == name)
            .map(|f| f.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.key == name)
    }

    /// Set a field, replacing the value in place if the name exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == name) {
            Some(field) => field.value = value,
            None => self.fields.push(BibTeXField { key: name, value }),
        }
    }

    /// Remove a field if present. Removing an absent field is a no-op.
    pub fn remove_if_present(&mut self, name: &str) -> Option<String> {
        let pos = self.fields.iter().position(|f| f.key == name)?;
        Some(self.fields.remove(pos).value)
    }

    /// Keep only the fields for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.fields.retain(|f| keep(&f.key, &f.value));
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.fields
            .iter_mut()
            .map(|f| (f.key.as_str(), &mut f.value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BibTeXEntry> for Record {
    /// A repeated field name keeps its first position and its last value.
    fn from(entry: BibTeXEntry) -> Self {
        let mut record = Record::new(entry.cite_key, entry.entry_type.as_str());
        for field in entry.fields {
            record.set(field.key, field.value);
        }
        record
    }
}

impl From<Record> for BibTeXEntry {
    fn from(record: Record) -> Self {
        let mut entry = BibTeXEntry::new(record.id, BibTeXEntryType::from_str(&record.entry_type));
        entry.fields = record.fields;
        entry
    }
}
