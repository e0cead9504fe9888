use crate::error::{ProcessingError, Result};
use std::collections::HashMap;
use std::ops::Range;

/// Dictionary-encoded text column.
///
/// Each distinct value is stored once in `categories`; rows hold a `u16`
/// code into it, or `None` for a missing value. Codes are assigned in
/// first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategoricalColumn {
    categories: Vec<String>,
    lookup: HashMap<String, u16>,
    codes: Vec<Option<u16>>,
}

impl CategoricalColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize) -> Self {
        Self {
            categories: Vec::new(),
            lookup: HashMap::new(),
            codes: Vec::with_capacity(rows),
        }
    }

    /// Rebuild a column from an existing dictionary and its codes.
    pub fn from_parts(categories: Vec<String>, codes: Vec<Option<u16>>) -> Result<Self> {
        if categories.len() > usize::from(u16::MAX) + 1 {
            return Err(ProcessingError::InvalidFormat(format!(
                "Dictionary with {} entries exceeds u16 key range",
                categories.len()
            )));
        }

        if let Some(bad) = codes.iter().flatten().find(|&&c| usize::from(c) >= categories.len()) {
            return Err(ProcessingError::InvalidFormat(format!(
                "Dictionary code {} out of bounds for {} categories",
                bad,
                categories.len()
            )));
        }

        let lookup = categories
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as u16))
            .collect();

        Ok(Self {
            categories,
            lookup,
            codes,
        })
    }

    /// Append a value, interning it into the dictionary.
    ///
    /// Fails with a range violation once the dictionary would need a
    /// 65 537th entry.
    pub fn push(&mut self, value: Option<&str>, column: &str, row: usize) -> Result<()> {
        let code = match value {
            None => None,
            Some(v) => Some(self.intern(v).ok_or_else(|| ProcessingError::RangeViolation {
                column: column.to_string(),
                row,
                value: format!("category #{} ('{}')", self.categories.len(), v),
                target: "u16 dictionary key",
            })?),
        };
        self.codes.push(code);
        Ok(())
    }

    fn intern(&mut self, value: &str) -> Option<u16> {
        if let Some(&code) = self.lookup.get(value) {
            return Some(code);
        }

        let code = u16::try_from(self.categories.len()).ok()?;
        self.categories.push(value.to_string());
        self.lookup.insert(value.to_string(), code);
        Some(code)
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .map(|code| self.categories[usize::from(code)].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.codes
            .iter()
            .map(|code| code.map(|c| self.categories[usize::from(c)].as_str()))
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn codes(&self) -> &[Option<u16>] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Copy of a row range; the dictionary is carried over whole.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            categories: self.categories.clone(),
            lookup: self.lookup.clone(),
            codes: self.codes[range].to_vec(),
        }
    }
}

/// Columns are equal when they decode to the same values; dictionary
/// order is not significant.
impl PartialEq for CategoricalColumn {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
