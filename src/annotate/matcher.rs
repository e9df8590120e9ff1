//! Driver name matching
//!
//! Finds the earliest whole-word, case-insensitive occurrence of any
//! directory name in a text. Offsets and lengths are byte positions in the
//! searched text, so they can be used to slice it directly.

use crate::models::DirectoryEntry;

/// A located driver name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatch<'a> {
    pub entry: &'a DirectoryEntry,
    /// Byte offset of the match in the text
    pub offset: usize,
    /// Byte length of the matched text
    pub length: usize,
}

impl NameMatch<'_> {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    entry: DirectoryEntry,
    chars: Vec<char>,
}

/// Match resolver over a fixed directory
#[derive(Debug, Clone, Default)]
pub struct DriverMatcher {
    candidates: Vec<Candidate>,
}

fn is_word_boundary(c: Option<char>) -> bool {
    c.map_or(true, |c| !c.is_alphanumeric())
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

impl DriverMatcher {
    /// Entries with a blank name are ignored
    pub fn new(directory: &[DirectoryEntry]) -> Self {
        let candidates = directory
            .iter()
            .filter(|entry| !entry.name.trim().is_empty())
            .map(|entry| Candidate {
                entry: entry.clone(),
                chars: entry.name.chars().collect(),
            })
            .collect();
        Self { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Byte length of `name` matched at the start of `text`, if it matches
    fn match_at(text: &str, name: &[char]) -> Option<usize> {
        let mut consumed = 0;
        let mut chars = text.chars();
        for &expected in name {
            let actual = chars.next()?;
            if !chars_match(actual, expected) {
                return None;
            }
            consumed += actual.len_utf8();
        }
        Some(consumed)
    }

    /// Best match at or after `start`
    ///
    /// The earliest valid occurrence wins; at the same offset the longer
    /// name wins, then directory order. `start` past the end or inside a
    /// UTF-8 sequence yields `None`.
    pub fn find_best_match<'a>(&'a self, text: &str, start: usize) -> Option<NameMatch<'a>> {
        let tail = text.get(start..)?;

        for (relative, _) in tail.char_indices() {
            let offset = start + relative;
            let before = text[..offset].chars().next_back();
            if !is_word_boundary(before) {
                continue;
            }

            let mut best: Option<NameMatch<'a>> = None;
            for candidate in &self.candidates {
                let Some(length) = Self::match_at(&text[offset..], &candidate.chars) else {
                    continue;
                };
                let after = text[offset + length..].chars().next();
                if !is_word_boundary(after) {
                    continue;
                }
                if best.map_or(true, |b| length > b.length) {
                    best = Some(NameMatch {
                        entry: &candidate.entry,
                        offset,
                        length,
                    });
                }
            }

            if best.is_some() {
                return best;
            }
        }

        None
    }

    /// Cheap pre-check used before splitting a text node
    pub fn contains_driver(&self, text: &str) -> bool {
        !self.is_empty() && self.find_best_match(text, 0).is_some()
    }
}
