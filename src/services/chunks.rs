// src/services/chunks.rs

//! Packing of taxonomy keywords into length-bounded search queries.

use std::fmt;

/// Separator placed between keywords of one query.
pub const JOIN: &str = " OR ";

/// An ordered run of keywords searched as one disjunctive query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryChunk {
    keywords: Vec<String>,
}

impl QueryChunk {
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords joined with `OR`.
    pub fn query(&self) -> String {
        self.keywords.join(JOIN)
    }

    /// Serialized length in characters, join overhead included.
    pub fn len(&self) -> usize {
        char_len_of(&self.keywords)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl fmt::Display for QueryChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query())
    }
}

fn char_len_of(keywords: &[String]) -> usize {
    let words: usize = keywords.iter().map(|k| k.chars().count()).sum();
    words + JOIN.len() * keywords.len().saturating_sub(1)
}

/// Greedily pack `keywords` (already sorted) into chunks of at most
/// `max_len` characters.
///
/// A keyword that alone exceeds the budget still gets a chunk of its own.
pub fn build_query_chunks(keywords: &[String], max_len: usize) -> Vec<QueryChunk> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for keyword in keywords {
        let keyword_len = keyword.chars().count();
        let added = if current.is_empty() {
            keyword_len
        } else {
            JOIN.len() + keyword_len
        };

        if !current.is_empty() && current_len + added > max_len {
            chunks.push(QueryChunk {
                keywords: std::mem::take(&mut current),
            });
            current.push(keyword.clone());
            current_len = keyword_len;
        } else {
            current.push(keyword.clone());
            current_len += added;
        }
    }

    if !current.is_empty() {
        chunks.push(QueryChunk { keywords: current });
    }
    chunks
}
