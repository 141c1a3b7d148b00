use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate document ID from file path using CRC32
pub fn get_document_id(path: &str) -> u32 {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    hasher.finalize()
}

/// Logical identity of a node, stable across tree generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    seed: u32,
    index: u32,
}

impl NodeId {
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}-{}", self.seed, self.index)
    }
}

/// Sequential ID generator for nodes within a document
///
/// The parser and every builder that creates nodes for the same document must
/// share one generator, otherwise ids collide.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: u32, // Document ID (CRC32)
    count: u32,
}

impl IdGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_id(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: u32) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId {
            seed: self.seed,
            index: self.count,
        }
    }

    /// Get document ID seed
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u32 {
        self.count
    }
}
