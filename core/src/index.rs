use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type Token = String;
/// Identifier of an indexed file: its canonical path rendered as a string.
pub type FileId = String;

static NO_POSTINGS: BTreeMap<FileId, u32> = BTreeMap::new();

/// Token -> (file -> occurrence count). Stored counts are always >= 1.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<Token, BTreeMap<FileId, u32>>,
    files: BTreeSet<FileId>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn add_occurrence(&mut self, file_id: &str, token: &str) {
        self.add_occurrences(file_id, token, 1);
    }

    /// Adds `count` occurrences of `token` in `file_id`. A zero count is ignored
    /// so the map never holds empty entries.
    pub fn add_occurrences(&mut self, file_id: &str, token: &str, count: u32) {
        if count == 0 {
            return;
        }
        self.register_file(file_id);
        let per_file = self.postings.entry(token.to_string()).or_default();
        match per_file.get_mut(file_id) {
            Some(n) => *n = n.saturating_add(count),
            None => {
                per_file.insert(file_id.to_string(), count);
            }
        }
    }

    /// Records a file as indexed even if it contributed no tokens.
    pub fn register_file(&mut self, file_id: &str) {
        if !self.files.contains(file_id) {
            self.files.insert(file_id.to_string());
        }
    }

    /// Per-file counts for an exact token; empty when the token was never seen.
    pub fn lookup(&self, token: &str) -> &BTreeMap<FileId, u32> {
        self.postings.get(token).unwrap_or(&NO_POSTINGS)
    }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.files.clear();
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }
    pub fn num_files(&self) -> usize { self.files.len() }
    pub fn is_empty(&self) -> bool { self.files.is_empty() }
}
