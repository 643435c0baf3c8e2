use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// A byte offset into the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub offset: usize,
}

impl Pos {
    pub fn new(offset: usize) -> Self {
        Pos { offset }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}", self.offset)
    }
}

/// An AST node together with the position it was parsed from.
///
/// Equality and hashing ignore the position, so two parses of equivalent
/// documents compare structurally equal.
#[derive(Debug, Clone, Serialize)]
pub struct Positioned<T> {
    pub pos: Pos,
    pub node: T,
}

impl<T> Positioned<T> {
    pub fn new(node: T, pos: Pos) -> Self {
        Positioned { pos, node }
    }

    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T: PartialEq> PartialEq for Positioned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<T: Eq> Eq for Positioned<T> {}

impl<T: Hash> Hash for Positioned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<T: Display> Display for Positioned<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.node.fmt(f)
    }
}
