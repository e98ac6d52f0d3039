//! OrderedTreeMap: an unbalanced binary search tree.
//!
//! Nodes live in a `SlotMap` arena and refer to each other by `NodeId`.
//! Child links express ownership in the tree sense; the parent link is a
//! plain back-reference used when splicing a node out. Neither keeps an
//! allocation alive, so there are no reference cycles to break.
//!
//! Ordering: left subtree keys < node key <= right subtree keys. Equal
//! keys fall right, which matters only under [`DuplicatePolicy::Keep`].
//!
//! Descents and traversals use loops and explicit stacks, so a degenerate
//! (list-shaped) tree does not exhaust the call stack.

use crate::config::DuplicatePolicy;
use crate::error::MapError;
use crate::map::KeyValueMap;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::mem;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

new_key_type! {
    struct NodeId;
}

#[derive(Debug)]
struct TreeNode<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

/// Binary search tree keyed by `K: Ord`.
///
/// Under [`DuplicatePolicy::Keep`] an equal key is inserted again down the
/// right side of the existing one. Lookups and removals then act on the
/// first equal node met on the way down, which is the oldest one.
pub struct OrderedTreeMap<K, V> {
    nodes: SlotMap<NodeId, TreeNode<K, V>>,
    root: Option<NodeId>,
    duplicates: DuplicatePolicy,
}

impl<K: Ord, V> Default for OrderedTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> OrderedTreeMap<K, V> {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(duplicates: DuplicatePolicy) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            duplicates,
        }
    }

    /// Number of nodes. Changes only when a node is created or removed.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `key -> value`. Returns the previous value when an equal
    /// key was updated in place (`Replace`); otherwise a new node is linked
    /// in as a leaf.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let replace = self.duplicates == DuplicatePolicy::Replace;
        let Some(mut cur) = self.root else {
            let id = self.nodes.insert(TreeNode::leaf(key, value, None));
            self.root = Some(id);
            return None;
        };
        loop {
            let node = &mut self.nodes[cur];
            let go_left = match key.cmp(&node.key) {
                Ordering::Less => true,
                Ordering::Equal if replace => return Some(mem::replace(&mut node.value, value)),
                Ordering::Equal | Ordering::Greater => false,
            };
            let next = if go_left { node.left } else { node.right };
            match next {
                Some(child) => cur = child,
                None => {
                    let id = self.nodes.insert(TreeNode::leaf(key, value, Some(cur)));
                    let parent = &mut self.nodes[cur];
                    if go_left {
                        parent.left = Some(id);
                    } else {
                        parent.right = Some(id);
                    }
                    return None;
                }
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            cur = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).is_some()
    }

    /// Remove the node `get` would find and return its value.
    ///
    /// A leaf is detached. A node with one child is replaced by that
    /// child. A node with two children takes over its in-order
    /// successor's entry, and the successor (which has no left child) is
    /// spliced out instead.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(id) = self.find(key) else {
            debug!(len = self.len(), "tree remove: key not found");
            return None;
        };
        let (_, value) = self.delete_node(id);
        trace!(len = self.len(), "tree remove");
        Some(value)
    }

    fn delete_node(&mut self, id: NodeId) -> (K, V) {
        let (left, right) = {
            let node = &self.nodes[id];
            (node.left, node.right)
        };
        match (left, right) {
            (Some(_), Some(right)) => {
                let succ = self.leftmost(right);
                let succ_right = self.nodes[succ].right;
                self.splice(succ, succ_right);
                let succ_node = self
                    .nodes
                    .remove(succ)
                    .expect("successor must be live until spliced out");
                let node = &mut self.nodes[id];
                let key = mem::replace(&mut node.key, succ_node.key);
                let value = mem::replace(&mut node.value, succ_node.value);
                (key, value)
            }
            (child, None) | (None, child) => {
                self.splice(id, child);
                let node = self
                    .nodes
                    .remove(id)
                    .expect("node must be live until spliced out");
                (node.key, node.value)
            }
        }
    }

    /// Put `child` where `id` hangs in the tree and clear both directions
    /// of every link that referred to `id`.
    fn splice(&mut self, id: NodeId, child: Option<NodeId>) {
        let parent = self.nodes[id].parent;
        if let Some(c) = child {
            self.nodes[c].parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(p) => {
                let parent_node = &mut self.nodes[p];
                if parent_node.left == Some(id) {
                    parent_node.left = child;
                } else {
                    parent_node.right = child;
                }
            }
        }
        let node = &mut self.nodes[id];
        node.parent = None;
        node.left = None;
        node.right = None;
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    /// Smallest entry.
    pub fn min(&self) -> Option<(&K, &V)> {
        let node = &self.nodes[self.leftmost(self.root?)];
        Some((&node.key, &node.value))
    }

    /// Largest entry.
    pub fn max(&self) -> Option<(&K, &V)> {
        let node = &self.nodes[self.rightmost(self.root?)];
        Some((&node.key, &node.value))
    }

    /// Edges on the longest root-to-leaf path: -1 when empty, 0 for a
    /// lone root. Computed on each call.
    pub fn height(&self) -> isize {
        let mut height = -1;
        let mut stack: Vec<(NodeId, isize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        height
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Left, node, right. Keys come out in non-decreasing order.
    pub fn in_order(&self) -> InOrder<'_, K, V> {
        InOrder {
            nodes: &self.nodes,
            stack: Vec::new(),
            cur: self.root,
        }
    }

    /// Node, left, right.
    pub fn pre_order(&self) -> PreOrder<'_, K, V> {
        PreOrder {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Left, right, node.
    pub fn post_order(&self) -> PostOrder<'_, K, V> {
        PostOrder {
            nodes: &self.nodes,
            stack: self.root.map(|r| (r, false)).into_iter().collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.in_order().map(|(k, _)| k)
    }

    /// Values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.in_order().map(|(_, v)| v)
    }
}

impl<K, V> TreeNode<K, V> {
    fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
        }
    }
}

/// In-order iterator over `(&K, &V)`.
pub struct InOrder<'a, K, V> {
    nodes: &'a SlotMap<NodeId, TreeNode<K, V>>,
    stack: Vec<NodeId>,
    cur: Option<NodeId>,
}

impl<'a, K, V> Iterator for InOrder<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some(id) = self.cur {
            self.stack.push(id);
            self.cur = nodes[id].left;
        }
        let node = &nodes[self.stack.pop()?];
        self.cur = node.right;
        Some((&node.key, &node.value))
    }
}

/// Pre-order iterator over `(&K, &V)`.
pub struct PreOrder<'a, K, V> {
    nodes: &'a SlotMap<NodeId, TreeNode<K, V>>,
    stack: Vec<NodeId>,
}

impl<'a, K, V> Iterator for PreOrder<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.stack.pop()?];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some((&node.key, &node.value))
    }
}

/// Post-order iterator over `(&K, &V)`.
pub struct PostOrder<'a, K, V> {
    nodes: &'a SlotMap<NodeId, TreeNode<K, V>>,
    // (node, children already scheduled)
    stack: Vec<(NodeId, bool)>,
}

impl<'a, K, V> Iterator for PostOrder<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some((id, expanded)) = self.stack.pop() {
            let node = &nodes[id];
            if expanded {
                return Some((&node.key, &node.value));
            }
            self.stack.push((id, true));
            self.stack.extend(node.right.map(|c| (c, false)));
            self.stack.extend(node.left.map(|c| (c, false)));
        }
        None
    }
}

impl<K: Ord, V> KeyValueMap<K, V> for OrderedTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) -> Result<Option<V>, MapError> {
        Ok(OrderedTreeMap::put(self, key, value))
    }

    fn get(&self, key: &K) -> Option<&V> {
        OrderedTreeMap::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        OrderedTreeMap::remove(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        OrderedTreeMap::contains(self, key)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// In-order and pre-order key listings, e.g. `3->5->7` and `5->3->7`.
impl<K: Ord + fmt::Debug, V> fmt::Display for OrderedTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("In-order tree traversal keys: ")?;
        write_keys(f, self.in_order())?;
        f.write_str("\nPre-order tree traversal keys: ")?;
        write_keys(f, self.pre_order())?;
        writeln!(f)
    }
}

fn write_keys<'a, K, V, I>(f: &mut fmt::Formatter<'_>, entries: I) -> fmt::Result
where
    K: fmt::Debug + 'a,
    V: 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    for (i, (k, _)) in entries.enumerate() {
        if i > 0 {
            f.write_str("->")?;
        }
        write!(f, "{k:?}")?;
    }
    Ok(())
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.in_order()).finish()
    }
}
