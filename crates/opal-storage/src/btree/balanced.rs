//! Classic B-tree keyed by integer id; realizes secondary indexes.

use super::Keyed;

struct Node<T> {
    keys: Vec<Keyed<T>>,
    children: Vec<usize>,
    is_leaf: bool,
}

/// A B-tree with minimum degree `t`: interior and leaf nodes both hold
/// entries, search/insert/delete follow the classical algorithm. Insertion
/// splits full nodes on the way down (the median moves out of the split
/// node); deletion refills sparse nodes on the way down by sibling borrow or
/// fuse.
pub struct BalancedTree<T> {
    nodes: Vec<Node<T>>,
    root: usize,
    min_degree: usize,
    len: usize,
}

impl<T> BalancedTree<T> {
    /// Creates an empty tree; `min_degree` is clamped to at least 3.
    pub fn new(min_degree: usize) -> Self {
        let root = Node {
            keys: Vec::new(),
            children: Vec::new(),
            is_leaf: true,
        };
        Self {
            nodes: vec![root],
            root: 0,
            min_degree: min_degree.max(3),
            len: 0,
        }
    }

    /// Returns the minimum degree `t`.
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Returns the maximum keys a node may hold (`2t - 1`).
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the root node handle.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Returns true if the node is a leaf.
    pub fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].is_leaf
    }

    /// Returns the node's child handles (empty for leaves).
    pub fn children(&self, node: usize) -> &[usize] {
        &self.nodes[node].children
    }

    /// Returns the node's entries.
    pub fn entries(&self, node: usize) -> &[Keyed<T>] {
        &self.nodes[node].keys
    }

    /// Locates a key. Returns the holding node and the entry position.
    pub fn search(&self, key: u32) -> Option<(usize, usize)> {
        let mut node = self.root;
        loop {
            let n = &self.nodes[node];
            let pos = n.keys.partition_point(|k| k.key < key);
            if pos < n.keys.len() && n.keys[pos].key == key {
                return Some((node, pos));
            }
            if n.is_leaf {
                return None;
            }
            node = n.children[pos];
        }
    }

    /// Returns the payload stored under `key`.
    pub fn get(&self, key: u32) -> Option<&T> {
        let (node, pos) = self.search(key)?;
        Some(&self.nodes[node].keys[pos].data)
    }

    /// Inserts an entry, splitting full nodes along the descent.
    pub fn insert(&mut self, entry: Keyed<T>) {
        if self.nodes[self.root].keys.len() == self.max_keys() {
            let old_root = self.root;
            let new_root = self.alloc(Node {
                keys: Vec::new(),
                children: vec![old_root],
                is_leaf: false,
            });
            self.root = new_root;
            self.split_child(new_root, 0);
        }
        self.insert_nonfull(self.root, entry);
        self.len += 1;
    }

    /// Removes the entry under `key`. Removing an absent key is a no-op.
    pub fn delete(&mut self, key: u32) -> bool {
        if self.remove_from(self.root, key).is_none() {
            return false;
        }
        if !self.nodes[self.root].is_leaf && self.nodes[self.root].keys.is_empty() {
            self.root = self.nodes[self.root].children[0];
        }
        self.len -= 1;
        true
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Splits the full child at `idx`: the left half keeps `t - 1` keys, the
    /// median moves up into `parent`, the right half becomes a new sibling.
    fn split_child(&mut self, parent: usize, idx: usize) {
        let t = self.min_degree;
        let child = self.nodes[parent].children[idx];
        let child_is_leaf = self.nodes[child].is_leaf;

        let right_keys = self.nodes[child].keys.split_off(t);
        let median = self.nodes[child].keys.pop().expect("full node has a median");
        let right_children = if child_is_leaf {
            Vec::new()
        } else {
            self.nodes[child].children.split_off(t)
        };

        let right = self.alloc(Node {
            keys: right_keys,
            children: right_children,
            is_leaf: child_is_leaf,
        });
        self.nodes[parent].keys.insert(idx, median);
        self.nodes[parent].children.insert(idx + 1, right);
    }

    fn insert_nonfull(&mut self, node: usize, entry: Keyed<T>) {
        let mut node = node;
        loop {
            let pos = self.nodes[node].keys.partition_point(|k| k.key < entry.key);
            if self.nodes[node].is_leaf {
                self.nodes[node].keys.insert(pos, entry);
                return;
            }

            let mut i = pos;
            let child = self.nodes[node].children[i];
            if self.nodes[child].keys.len() == self.max_keys() {
                self.split_child(node, i);
                if entry.key > self.nodes[node].keys[i].key {
                    i += 1;
                }
            }
            node = self.nodes[node].children[i];
        }
    }

    /// Removes `key` from the subtree under `node`, returning the entry.
    fn remove_from(&mut self, node: usize, key: u32) -> Option<Keyed<T>> {
        let t = self.min_degree;
        let pos = self.nodes[node].keys.partition_point(|k| k.key < key);
        let found = pos < self.nodes[node].keys.len() && self.nodes[node].keys[pos].key == key;

        if self.nodes[node].is_leaf {
            return found.then(|| self.nodes[node].keys.remove(pos));
        }

        if found {
            let left = self.nodes[node].children[pos];
            let right = self.nodes[node].children[pos + 1];

            if self.nodes[left].keys.len() >= t {
                let pred_key = self.rightmost_key(left);
                let replacement = self.remove_from(left, pred_key)?;
                return Some(std::mem::replace(&mut self.nodes[node].keys[pos], replacement));
            }
            if self.nodes[right].keys.len() >= t {
                let succ_key = self.leftmost_key(right);
                let replacement = self.remove_from(right, succ_key)?;
                return Some(std::mem::replace(&mut self.nodes[node].keys[pos], replacement));
            }

            // Both children at minimum fill: fuse them around the key.
            let separator = self.nodes[node].keys.remove(pos);
            self.nodes[node].children.remove(pos + 1);
            self.fuse(left, separator, right);
            return self.remove_from(left, key);
        }

        let child = self.nodes[node].children[pos];
        let child = if self.nodes[child].keys.len() < t {
            self.refill_child(node, pos)
        } else {
            child
        };
        self.remove_from(child, key)
    }

    /// Ensures the child at `pos` can lose a key: borrow from a sibling with
    /// spare keys, otherwise fuse with one. Returns the node to descend into.
    fn refill_child(&mut self, node: usize, pos: usize) -> usize {
        let t = self.min_degree;
        let child = self.nodes[node].children[pos];
        let left_sib = (pos > 0).then(|| self.nodes[node].children[pos - 1]);
        let right_sib = (pos + 1 < self.nodes[node].children.len())
            .then(|| self.nodes[node].children[pos + 1]);

        if let Some(left) = left_sib.filter(|&l| self.nodes[l].keys.len() >= t) {
            let replacement = self.nodes[left].keys.pop().expect("donor has keys");
            let donation = std::mem::replace(&mut self.nodes[node].keys[pos - 1], replacement);
            self.nodes[child].keys.insert(0, donation);
            if !self.nodes[left].is_leaf {
                let moved = self.nodes[left].children.pop().expect("donor has children");
                self.nodes[child].children.insert(0, moved);
            }
            return child;
        }

        if let Some(right) = right_sib.filter(|&r| self.nodes[r].keys.len() >= t) {
            let replacement = self.nodes[right].keys.remove(0);
            let donation = std::mem::replace(&mut self.nodes[node].keys[pos], replacement);
            self.nodes[child].keys.push(donation);
            if !self.nodes[right].is_leaf {
                let moved = self.nodes[right].children.remove(0);
                self.nodes[child].children.push(moved);
            }
            return child;
        }

        if let Some(right) = right_sib {
            let separator = self.nodes[node].keys.remove(pos);
            self.nodes[node].children.remove(pos + 1);
            self.fuse(child, separator, right);
            child
        } else {
            let left = left_sib.expect("non-root interior node has a sibling");
            let separator = self.nodes[node].keys.remove(pos - 1);
            self.nodes[node].children.remove(pos);
            self.fuse(left, separator, child);
            left
        }
    }

    /// Merges `right` and the separating key into `left`.
    fn fuse(&mut self, left: usize, separator: Keyed<T>, right: usize) {
        let mut right_keys = std::mem::take(&mut self.nodes[right].keys);
        let mut right_children = std::mem::take(&mut self.nodes[right].children);
        let left_node = &mut self.nodes[left];
        left_node.keys.push(separator);
        left_node.keys.append(&mut right_keys);
        left_node.children.append(&mut right_children);
    }

    fn rightmost_key(&self, node: usize) -> u32 {
        let mut node = node;
        while !self.nodes[node].is_leaf {
            node = *self.nodes[node].children.last().expect("interior node has children");
        }
        self.nodes[node].keys.last().expect("leaf on a delete path has keys").key
    }

    fn leftmost_key(&self, node: usize) -> u32 {
        let mut node = node;
        while !self.nodes[node].is_leaf {
            node = self.nodes[node].children[0];
        }
        self.nodes[node].keys[0].key
    }
}
