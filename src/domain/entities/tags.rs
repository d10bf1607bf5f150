//! Insertion-ordered tag set and the tag merge rule.

use std::slice;

/// An ordered set of tags: unique, ordered by first insertion.
///
/// No normalization is applied; case and whitespace are preserved as given,
/// so `"Go"` and `"go"` are distinct tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tag` if it is not already present.
    ///
    /// Returns `true` if the tag was inserted.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.tags.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Merges tag lists into a unique sequence ordered by first appearance.
///
/// Lists are processed in call order, each tag in list order; a tag is kept
/// the first time it is seen across the whole call and skipped on every later
/// occurrence.
pub fn unique_tags<I, L, S>(lists: I) -> TagSet
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = TagSet::new();
    for list in lists {
        for tag in list {
            result.insert(tag.as_ref());
        }
    }
    result
}
