//! Post and comment tree structures.

use std::collections::VecDeque;

/// A post located by search or listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    /// Base-36 post identifier (without the `t3_` prefix)
    pub id: String,

    /// Net vote score at the time the post was seen
    pub score: i64,

    pub title: String,

    /// Self-text; empty until loaded for link posts
    pub body: String,

    /// Comment tree; empty until loaded
    pub comments: CommentForest,
}

impl Post {
    pub fn new(id: impl Into<String>, score: i64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score,
            title: title.into(),
            ..Self::default()
        }
    }

    /// Fullname used by the API to reference this post.
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }

    /// Title, body and every comment body joined by single spaces.
    ///
    /// Comments are visited breadth-first; empty parts are skipped.
    pub fn aggregate_text(&self) -> String {
        let comments = self.comments.list();
        std::iter::once(self.title.as_str())
            .chain(std::iter::once(self.body.as_str()))
            .chain(comments.iter().map(|c| c.body.as_str()))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single comment with its direct replies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: String,

    /// Fullname of the parent (`t3_` for top level, `t1_` for replies)
    pub parent_id: String,

    pub body: String,

    /// Nesting depth, zero for top-level comments
    pub depth: usize,

    pub replies: Vec<CommentNode>,
}

/// Placeholder for comments the API did not include in the initial tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoreComments {
    pub id: String,
    pub parent_id: String,

    /// Identifiers of the collapsed comments
    pub children: Vec<String>,

    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentNode {
    Comment(Comment),
    More(MoreComments),
}

/// Comment tree of a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentForest {
    roots: Vec<CommentNode>,
}

impl CommentForest {
    pub fn new(roots: Vec<CommentNode>) -> Self {
        Self { roots }
    }

    /// All loaded comments in breadth-first order.
    pub fn list(&self) -> Vec<&Comment> {
        let mut out = Vec::new();
        let mut queue: VecDeque<&CommentNode> = self.roots.iter().collect();
        while let Some(node) = queue.pop_front() {
            if let CommentNode::Comment(comment) = node {
                out.push(comment);
                queue.extend(comment.replies.iter());
            }
        }
        out
    }

    /// Number of unexpanded placeholders anywhere in the tree.
    pub fn more_count(&self) -> usize {
        fn count(nodes: &[CommentNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    CommentNode::More(_) => 1,
                    CommentNode::Comment(c) => count(&c.replies),
                })
                .sum()
        }
        count(&self.roots)
    }

    /// Remove and return the first placeholder in breadth-first order.
    pub fn take_more(&mut self) -> Option<MoreComments> {
        let path = self.first_more_path()?;
        let (last, parents) = path.split_last()?;

        let mut siblings = &mut self.roots;
        for &index in parents {
            siblings = match siblings.get_mut(index) {
                Some(CommentNode::Comment(comment)) => &mut comment.replies,
                _ => return None,
            };
        }

        if !matches!(siblings.get(*last), Some(CommentNode::More(_))) {
            return None;
        }
        match siblings.remove(*last) {
            CommentNode::More(more) => Some(more),
            CommentNode::Comment(_) => None,
        }
    }

    /// Attach a node under the comment named by `parent_id`.
    ///
    /// Nodes whose parent is the post itself, or whose parent is not in the
    /// tree, are appended at the top level.
    pub fn attach(&mut self, node: CommentNode) {
        let parent_id = match &node {
            CommentNode::Comment(c) => c.parent_id.as_str(),
            CommentNode::More(m) => m.parent_id.as_str(),
        };

        if let Some(parent) = parent_id
            .strip_prefix("t1_")
            .and_then(|id| find_comment_mut(&mut self.roots, id))
        {
            parent.replies.push(node);
            return;
        }
        self.roots.push(node);
    }

    fn first_more_path(&self) -> Option<Vec<usize>> {
        let mut queue: VecDeque<(Vec<usize>, &CommentNode)> = self
            .roots
            .iter()
            .enumerate()
            .map(|(i, node)| (vec![i], node))
            .collect();

        while let Some((path, node)) = queue.pop_front() {
            match node {
                CommentNode::More(_) => return Some(path),
                CommentNode::Comment(comment) => {
                    for (i, child) in comment.replies.iter().enumerate() {
                        let mut child_path = path.clone();
                        child_path.push(i);
                        queue.push_back((child_path, child));
                    }
                }
            }
        }
        None
    }
}

fn find_comment_mut<'a>(nodes: &'a mut [CommentNode], id: &str) -> Option<&'a mut Comment> {
    for node in nodes.iter_mut() {
        if let CommentNode::Comment(comment) = node {
            if comment.id == id {
                return Some(comment);
            }
            if let Some(found) = find_comment_mut(&mut comment.replies, id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, parent: &str, body: &str, depth: usize) -> Comment {
        Comment {
            id: id.to_string(),
            parent_id: parent.to_string(),
            body: body.to_string(),
            depth,
            replies: Vec::new(),
        }
    }

    fn more(id: &str, parent: &str, children: &[&str]) -> MoreComments {
        MoreComments {
            id: id.to_string(),
            parent_id: parent.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
            depth: 0,
        }
    }

    fn sample_forest() -> CommentForest {
        let mut a = comment("a", "t3_p", "first", 0);
        let mut a1 = comment("a1", "t1_a", "first reply", 1);
        a1.replies
            .push(CommentNode::Comment(comment("a11", "t1_a1", "deep", 2)));
        a.replies.push(CommentNode::Comment(a1));
        a.replies.push(CommentNode::More(more("m1", "t1_a", &["x"])));
        let b = comment("b", "t3_p", "second", 0);
        CommentForest::new(vec![
            CommentNode::Comment(a),
            CommentNode::Comment(b),
            CommentNode::More(more("m0", "t3_p", &["y", "z"])),
        ])
    }

    #[test]
    fn test_list_is_breadth_first() {
        let forest = sample_forest();
        let bodies: Vec<_> = forest.list().iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "first reply", "deep"]);
    }

    #[test]
    fn test_take_more_breadth_first() {
        let mut forest = sample_forest();
        assert_eq!(forest.more_count(), 2);

        let first = forest.take_more().unwrap();
        assert_eq!(first.id, "m0");
        let second = forest.take_more().unwrap();
        assert_eq!(second.id, "m1");
        assert!(forest.take_more().is_none());
        assert_eq!(forest.more_count(), 0);
        assert_eq!(forest.list().len(), 4);
    }

    #[test]
    fn test_attach_under_parent_and_root() {
        let mut forest = sample_forest();
        forest.attach(CommentNode::Comment(comment("c", "t1_a11", "deeper", 3)));
        forest.attach(CommentNode::Comment(comment("d", "t3_p", "late", 0)));
        forest.attach(CommentNode::Comment(comment("e", "t1_gone", "orphan", 4)));

        let bodies: Vec<_> = forest.list().iter().map(|c| c.body.as_str()).collect();
        assert_eq!(
            bodies,
            vec!["first", "second", "late", "orphan", "first reply", "deep", "deeper"]
        );
    }

    #[test]
    fn test_aggregate_text_skips_empty_parts() {
        let mut post = Post::new("p", 3, "Title here");
        post.comments = sample_forest();
        assert_eq!(
            post.aggregate_text(),
            "Title here first second first reply deep"
        );

        post.body = "Body text.".to_string();
        assert!(post.aggregate_text().starts_with("Title here Body text. first"));
    }

    #[test]
    fn test_fullname() {
        assert_eq!(Post::new("abc123", 0, "t").fullname(), "t3_abc123");
    }
}
