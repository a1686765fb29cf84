//! Pre-order traversal and identity assignment.

use crate::node::Node;

struct Frame<'a> {
    node: &'a Node,
    /// Index of `node` within its parent's children (0 for the root)
    index: usize,
}

/// Lazy pre-order walk over a tree.
///
/// Besides yielding nodes, the traversal remembers where the most recently
/// yielded node sits: its parent, its ancestor stack and its child-index
/// path. Create a fresh traversal per lookup; it borrows the tree, so the
/// tree cannot change underneath it.
pub struct Traversal<'a> {
    root: &'a Node,
    stack: Vec<Frame<'a>>,
    started: bool,
}

impl<'a> Traversal<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self {
            root,
            stack: Vec::new(),
            started: false,
        }
    }

    /// Parent of the last yielded node. `None` for the root.
    pub fn parent(&self) -> Option<&'a Node> {
        let len = self.stack.len();
        if len < 2 {
            return None;
        }
        Some(self.stack[len - 2].node)
    }

    /// Ancestors of the last yielded node, root first, node itself last.
    pub fn stack(&self) -> Vec<&'a Node> {
        self.stack.iter().map(|frame| frame.node).collect()
    }

    /// Child indices leading from the root to the last yielded node.
    pub fn child_path(&self) -> Vec<usize> {
        self.stack.iter().skip(1).map(|frame| frame.index).collect()
    }

    /// Index of the last yielded node among its siblings
    pub fn index_in_parent(&self) -> Option<usize> {
        if self.stack.len() < 2 {
            return None;
        }
        self.stack.last().map(|frame| frame.index)
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        if !self.started {
            self.started = true;
            self.stack.push(Frame {
                node: self.root,
                index: 0,
            });
            return Some(self.root);
        }

        // Descend into the first child of the current node
        let current = self.stack.last().map(|frame| frame.node)?;
        if let Some(first) = current.children.first() {
            self.stack.push(Frame {
                node: first,
                index: 0,
            });
            return Some(first);
        }

        // Otherwise climb until an ancestor has a next sibling
        while let Some(frame) = self.stack.pop() {
            let Some(parent) = self.stack.last().map(|parent| parent.node) else {
                break;
            };
            let next_index = frame.index + 1;
            if let Some(sibling) = parent.children.get(next_index) {
                self.stack.push(Frame {
                    node: sibling,
                    index: next_index,
                });
                return Some(sibling);
            }
        }

        None
    }
}

/// A node found by identity, with enough context to mutate it afterwards.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub node: &'a Node,
    pub parent: Option<&'a Node>,
    /// Ancestors from the root down to `node` inclusive
    pub stack: Vec<&'a Node>,
    /// Child indices from the root to `node`
    pub path: Vec<usize>,
}

impl Located<'_> {
    /// Index of the node among its parent's children
    pub fn index_in_parent(&self) -> Option<usize> {
        if self.path.is_empty() {
            None
        } else {
            self.path.last().copied()
        }
    }

    /// `/`-joined names from the root down to the node, e.g. `style/info/title`
    pub fn names_path(&self) -> String {
        self.stack
            .iter()
            .map(|node| node.name.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Find the node at pre-order position `id`.
///
/// The position in the walk is authoritative, not the stored `node_id`, so
/// this also works on trees whose identities are stale.
pub fn locate(root: &Node, id: usize) -> Option<Located<'_>> {
    let mut traversal = root.traverse();
    let mut index = 0;
    while let Some(node) = traversal.next() {
        if index == id {
            return Some(Located {
                node,
                parent: traversal.parent(),
                stack: traversal.stack(),
                path: traversal.child_path(),
            });
        }
        index += 1;
    }
    None
}

/// Reassign every identity in the tree by pre-order position, root = 0.
///
/// Returns the number of nodes in the tree.
pub fn renumber(root: &mut Node) -> usize {
    renumber_from(root, 0)
}

/// Reassign identities within one subtree, starting at `start`.
///
/// Returns the identity following the last node of the subtree.
pub fn renumber_from(node: &mut Node, start: usize) -> usize {
    node.node_id = start;
    let mut next = start + 1;
    for child in node.children.iter_mut() {
        next = renumber_from(child, next);
    }
    next
}
