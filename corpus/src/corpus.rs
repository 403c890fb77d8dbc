use std::collections::{HashMap, HashSet};

use crate::CorpusError;

/// A feature vector keyed by the file name it was extracted from.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVector {
    pub name: String,
    pub vector: Vec<f32>,
}

impl NamedVector {
    pub fn new(name: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            vector,
        }
    }
}

/// Corpus is the ordered, append-only set of named vectors.
///
/// Iteration follows insertion order: previously persisted entries first,
/// then each merged batch in the order it was handed to [`Corpus::merge`].
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<NamedVector>,
    index: HashMap<String, usize>,
    dim: Option<usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector length shared by every entry, or `None` while the corpus is empty.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedVector> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedVector> {
        self.entries.iter()
    }

    /// Appends `new_entries` after the existing entries, preserving their order.
    ///
    /// The batch is validated as a whole before anything is appended: a name
    /// that already exists (in the corpus or earlier in the batch), an empty
    /// vector, or a vector whose length differs from the corpus dimension
    /// rejects the entire batch and leaves the corpus untouched. When the
    /// corpus is empty the first entry establishes the dimension.
    ///
    /// Returns the number of entries appended.
    pub fn merge(&mut self, new_entries: Vec<NamedVector>) -> Result<usize, CorpusError> {
        let dim = self.validate(&new_entries)?;

        let added = new_entries.len();
        self.entries.reserve(added);
        for entry in new_entries {
            self.index.insert(entry.name.clone(), self.entries.len());
            self.entries.push(entry);
        }
        self.dim = dim;
        Ok(added)
    }

    /// Checks `batch` against the corpus and returns the dimension the corpus
    /// will have once it is appended.
    fn validate(&self, batch: &[NamedVector]) -> Result<Option<usize>, CorpusError> {
        let mut want = self.dim;
        let mut seen = HashSet::with_capacity(batch.len());

        for entry in batch {
            if entry.vector.is_empty() {
                return Err(CorpusError::EmptyVector(entry.name.clone()));
            }
            if self.index.contains_key(&entry.name) || !seen.insert(entry.name.as_str()) {
                return Err(CorpusError::DuplicateName(entry.name.clone()));
            }
            match want {
                Some(want) if entry.vector.len() != want => {
                    return Err(CorpusError::DimensionMismatch {
                        name: entry.name.clone(),
                        got: entry.vector.len(),
                        want,
                    });
                }
                Some(_) => {}
                None => want = Some(entry.vector.len()),
            }
        }
        Ok(want)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a NamedVector;
    type IntoIter = std::slice::Iter<'a, NamedVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
