// src/services/pool.rs

//! Per-forum candidate pool keyed by post identity.

use std::collections::HashMap;

use crate::models::Post;

/// What a merge did with the offered post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// Offered post scored strictly higher and replaced the stored one
    Replaced,
    /// Stored post scored higher or equal and was kept
    Kept,
}

/// Deduplicated candidates, one per post id.
///
/// Iteration follows first-insertion order; a replacement keeps the slot.
#[derive(Debug, Default)]
pub struct PostPool {
    index: HashMap<String, usize>,
    posts: Vec<Post>,
}

impl PostPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Post> {
        self.index.get(id).map(|&slot| &self.posts[slot])
    }

    /// Keep the highest-scoring instance per id. Ties keep the stored post.
    pub fn merge(&mut self, post: Post) -> MergeOutcome {
        match self.index.get(&post.id) {
            Some(&slot) if post.score > self.posts[slot].score => {
                self.posts[slot] = post;
                MergeOutcome::Replaced
            }
            Some(_) => MergeOutcome::Kept,
            None => {
                self.index.insert(post.id.clone(), self.posts.len());
                self.posts.push(post);
                MergeOutcome::Inserted
            }
        }
    }

    /// Store `post` regardless of score, overwriting any entry with its id.
    pub fn put(&mut self, post: Post) {
        match self.index.get(&post.id) {
            Some(&slot) => self.posts[slot] = post,
            None => {
                self.index.insert(post.id.clone(), self.posts.len());
                self.posts.push(post);
            }
        }
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }
}
