//! Node identity.
//!
//! Every AST node carries a [`NodeId`]. Ids are assigned by the parser in
//! creation order, so parsing the same tokens twice yields the same ids, and
//! the file component keeps ids unique after units of several files are
//! merged. Facts computed later (resolved types, referenced symbols) are kept
//! in side tables keyed by `NodeId` rather than on the nodes themselves.

use std::fmt;

/// Index of a source file within one frontend run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileId(pub u32);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub file: FileId,
    pub index: u32,
}

impl NodeId {
    pub const fn new(file: FileId, index: u32) -> Self {
        Self { file, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.index)
    }
}

/// Hands out consecutive node ids for one file.
#[derive(Debug, Clone)]
pub struct NodeIdGenerator {
    file: FileId,
    next: u32,
}

impl NodeIdGenerator {
    pub fn new(file: FileId) -> Self {
        Self { file, next: 0 }
    }

    #[inline]
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.file, self.next);
        self.next += 1;
        id
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_consecutive_per_file() {
        let mut ids = NodeIdGenerator::new(FileId(3));
        assert_eq!(ids.next_id(), NodeId::new(FileId(3), 0));
        assert_eq!(ids.next_id(), NodeId::new(FileId(3), 1));
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn ids_of_different_files_differ() {
        let a = NodeIdGenerator::new(FileId(0)).next_id();
        let b = NodeIdGenerator::new(FileId(1)).next_id();
        assert_ne!(a, b);
        assert_eq!(b.to_string(), "#1:0");
    }
}
