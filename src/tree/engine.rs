// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The B-tree engine: search, insert-with-split, delete-with-borrow/
//! merge/rotation, ordered extrema scans, and the public contract that
//! ties them to an external content store.

use super::metadata::Metadata;
use super::node::{Node, NONE_ID};
use super::node_store::NodeStore;
use crate::codec::Value;
use crate::content::{ContentStore, Resolved};
use crate::error::{IndexError, IndexResult};
use crate::schema::FieldKind;
use crate::store::WriteLock;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Static parameters an index is opened with. These must not change for
/// an existing pair of files — the node schema's field widths are
/// derived from `b` and `key_kind` at open time.
///
/// Validated explicitly at open time and handed to every operation
/// rather than read from a hidden global.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Branching factor (max children per node). Must be `>= 3`.
    pub b: u16,
    /// Declared kind of every key in this tree.
    pub key_kind: FieldKind,
    /// Directory holding this index's `nodes.bin`, `metadata.bin`, and
    /// `write.lock`.
    pub directory: PathBuf,
}

impl TreeConfig {
    fn validate(&self) -> IndexResult<()> {
        if self.b < 3 {
            return Err(IndexError::InvalidBranchingFactor { b: self.b });
        }
        Ok(())
    }
}

/// A disk-backed B-tree index: the engine named in the public contract.
///
/// Holds the single write lock for its directory for the lifetime of the
/// instance and is the sole writer of its two backing files.
#[derive(Debug)]
pub struct BTreeIndex {
    config: TreeConfig,
    nodes: NodeStore,
    metadata: Metadata,
    root_id: i64,
    _lock: WriteLock,
}

impl BTreeIndex {
    /// Open (creating if absent) the index rooted at `config.directory`.
    ///
    /// On first ever access the metadata record is absent; an empty
    /// root leaf is allocated and its id persisted to metadata before
    /// this call returns.
    pub fn open(config: TreeConfig) -> IndexResult<Self> {
        config.validate()?;
        let lock = WriteLock::acquire(&config.directory)?;

        let mut nodes = NodeStore::open(
            &config.directory.join("nodes.bin"),
            config.key_kind.clone(),
            config.b,
        )?;
        let mut metadata = Metadata::open(&config.directory.join("metadata.bin"))?;

        let root_id = match metadata.get_root_id()? {
            Some(id) => id,
            None => {
                let mut root = Node::new_leaf();
                let id = nodes.put_node(&mut root)?;
                metadata.set_root_id(id)?;
                id
            }
        };

        Ok(Self {
            config,
            nodes,
            metadata,
            root_id,
            _lock: lock,
        })
    }

    fn keys_size(&self) -> usize {
        (self.config.b - 1) as usize
    }

    fn min_keys(&self) -> usize {
        self.keys_size() / 2
    }

    fn load(&self, id: i64) -> IndexResult<Node> {
        self.nodes
            .get_node(id)?
            .ok_or_else(|| IndexError::IndexCorrupt {
                reason: format!("node {} referenced but missing from the node store", id),
            })
    }

    fn save(&mut self, node: &mut Node) -> IndexResult<i64> {
        self.nodes.put_node(node)
    }

    // ---- search -----------------------------------------------------

    /// Every content-id paired with `key` across the entire tree, in
    /// tree-encounter order, duplicates preserved.
    ///
    /// Because equal keys may recur across sibling subtrees under the
    /// non-strict ordering invariant, every child straddling a run of
    /// equal keys at a node is visited exactly once — not just the
    /// single rightmost such child, which can double-visit or miss a
    /// subtree.
    pub fn find_contents(&self, key: &Value) -> IndexResult<Vec<i64>> {
        let mut out = Vec::new();
        self.collect_contents(self.root_id, key, &mut out)?;
        Ok(out)
    }

    fn collect_contents(&self, node_id: i64, key: &Value, out: &mut Vec<i64>) -> IndexResult<()> {
        let node = self.load(node_id)?;
        let m = node.keys.len();

        let mut i = 0;
        while i < m && key.compare(&node.keys[i]) == Ordering::Greater {
            i += 1;
        }
        let mut j = i;
        while j < m && key.compare(&node.keys[j]) == Ordering::Equal {
            out.push(node.contents[j]);
            j += 1;
        }

        if node.is_leaf() {
            return Ok(());
        }
        for child_pos in i..=j {
            if let Some(&child_id) = node.children_ids.get(child_pos) {
                self.collect_contents(child_id, key, out)?;
            }
        }
        Ok(())
    }

    /// The content-id if `(key, content)` is present, else `None` — an
    /// existence probe.
    pub fn find_with_key_and_content(&self, key: &Value, content: i64) -> IndexResult<Option<i64>> {
        Ok(self
            .find_contents(key)?
            .into_iter()
            .find(|&c| c == content))
    }

    /// First occurrence of `key` in top-down, left-to-right traversal
    /// order, without descending past the node where the first match is
    /// found.
    fn first_match(&self, key: &Value) -> IndexResult<Option<(i64, usize)>> {
        let mut node_id = self.root_id;
        loop {
            let node = self.load(node_id)?;
            let m = node.keys.len();
            let mut pos = 0;
            while pos < m && key.compare(&node.keys[pos]) == Ordering::Greater {
                pos += 1;
            }
            if pos < m && key.compare(&node.keys[pos]) == Ordering::Equal {
                return Ok(Some((node.id, pos)));
            }
            if node.is_leaf() {
                return Ok(None);
            }
            node_id = node.children_ids[pos];
        }
    }

    pub fn find_first_or_default(&self, key: &Value) -> IndexResult<Option<i64>> {
        match self.first_match(key)? {
            Some((node_id, pos)) => Ok(Some(self.load(node_id)?.contents[pos])),
            None => Ok(None),
        }
    }

    pub fn find_smallest(&self) -> IndexResult<Option<i64>> {
        let mut node = self.load(self.root_id)?;
        loop {
            if node.is_leaf() {
                return Ok(node.contents.first().copied());
            }
            node = self.load(node.children_ids[0])?;
        }
    }

    fn collect_in_order(&self, node_id: i64, out: &mut Vec<i64>, limit: usize) -> IndexResult<()> {
        if out.len() >= limit {
            return Ok(());
        }
        let node = self.load(node_id)?;
        let m = node.keys.len();
        if node.is_leaf() {
            for &content in node.contents.iter().take(limit - out.len()) {
                out.push(content);
            }
            return Ok(());
        }
        for i in 0..m {
            if out.len() >= limit {
                return Ok(());
            }
            self.collect_in_order(node.children_ids[i], out, limit)?;
            if out.len() >= limit {
                return Ok(());
            }
            out.push(node.contents[i]);
        }
        if out.len() < limit {
            self.collect_in_order(node.children_ids[m], out, limit)?;
        }
        Ok(())
    }

    fn collect_in_order_rev(
        &self,
        node_id: i64,
        out: &mut Vec<i64>,
        limit: usize,
    ) -> IndexResult<()> {
        if out.len() >= limit {
            return Ok(());
        }
        let node = self.load(node_id)?;
        let m = node.keys.len();
        if node.is_leaf() {
            for &content in node.contents.iter().rev().take(limit - out.len()) {
                out.push(content);
            }
            return Ok(());
        }
        self.collect_in_order_rev(node.children_ids[m], out, limit)?;
        for i in (0..m).rev() {
            if out.len() >= limit {
                return Ok(());
            }
            out.push(node.contents[i]);
            if out.len() >= limit {
                return Ok(());
            }
            self.collect_in_order_rev(node.children_ids[i], out, limit)?;
        }
        Ok(())
    }

    /// Up to `n` content-ids in ascending key order; fewer if the tree
    /// holds fewer than `n`.
    pub fn find_n_smallest(&self, n: usize) -> IndexResult<Vec<i64>> {
        let mut out = Vec::new();
        self.collect_in_order(self.root_id, &mut out, n)?;
        Ok(out)
    }

    /// Up to `n` content-ids in descending key order.
    pub fn find_n_biggest(&self, n: usize) -> IndexResult<Vec<i64>> {
        let mut out = Vec::new();
        self.collect_in_order_rev(self.root_id, &mut out, n)?;
        Ok(out)
    }

    // ---- row-resolving wrappers --------------------------------------

    /// `find_contents` followed by content-store resolution; degrades to
    /// raw content-ids when `store` is `None`.
    pub fn find<Row>(
        &self,
        key: &Value,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Vec<Resolved<Row>>> {
        Resolved::resolve_all(self.find_contents(key)?, store)
    }

    pub fn find_first_or_default_row<Row>(
        &self,
        key: &Value,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Option<Resolved<Row>>> {
        Resolved::resolve_one(self.find_first_or_default(key)?, store)
    }

    pub fn find_n_smallest_rows<Row>(
        &self,
        n: usize,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Vec<Resolved<Row>>> {
        Resolved::resolve_all(self.find_n_smallest(n)?, store)
    }

    pub fn find_n_biggest_rows<Row>(
        &self,
        n: usize,
        store: Option<&dyn ContentStore<Row>>,
    ) -> IndexResult<Vec<Resolved<Row>>> {
        Resolved::resolve_all(self.find_n_biggest(n)?, store)
    }

    // ---- insert -------------------------------------------------------

    /// After return, `find_with_key_and_content(key, content)` returns
    /// non-`None` and every tree invariant (sorted keys, `k+1` children,
    /// balanced leaf depth) holds.
    pub fn insert(&mut self, key: Value, content: i64) -> IndexResult<()> {
        let leaf_id = self.find_leaf_for_insert(&key)?;
        let mut leaf = self.load(leaf_id)?;

        let mut pos = 0;
        while pos < leaf.keys.len() && leaf.keys[pos].compare(&key) != Ordering::Greater {
            pos += 1;
        }
        leaf.keys.insert(pos, key);
        leaf.contents.insert(pos, content);
        self.save(&mut leaf)?;

        if leaf.keys.len() > self.keys_size() {
            self.split(leaf.id)?;
        }
        Ok(())
    }

    fn find_leaf_for_insert(&self, key: &Value) -> IndexResult<i64> {
        let mut node_id = self.root_id;
        loop {
            let node = self.load(node_id)?;
            if node.is_leaf() {
                return Ok(node_id);
            }
            let m = node.keys.len();
            let mut pos = 0;
            while pos < m && key.compare(&node.keys[pos]) == Ordering::Greater {
                pos += 1;
            }
            node_id = node.children_ids[pos];
        }
    }

    fn reparent_children_ids(&mut self, ids: &[i64], new_parent: i64) -> IndexResult<()> {
        for &id in ids {
            let mut child = self.load(id)?;
            child.parent_id = new_parent;
            self.save(&mut child)?;
        }
        Ok(())
    }

    /// Split an overflowing node N with parent P (or root if P is nil).
    fn split(&mut self, node_id: i64) -> IndexResult<()> {
        let node = self.load(node_id)?;
        let keys_size = self.keys_size();
        let mid = keys_size / 2;

        let split_key = node.keys[mid].clone();
        let split_content = node.contents[mid];

        let is_leaf = node.is_leaf();
        let mut left = Node {
            id: NONE_ID,
            parent_id: node.parent_id,
            keys: node.keys[..mid].to_vec(),
            contents: node.contents[..mid].to_vec(),
            children_ids: if is_leaf {
                Vec::new()
            } else {
                node.children_ids[..=mid].to_vec()
            },
        };
        let mut right = Node {
            id: NONE_ID,
            parent_id: node.parent_id,
            keys: node.keys[mid + 1..].to_vec(),
            contents: node.contents[mid + 1..].to_vec(),
            children_ids: if is_leaf {
                Vec::new()
            } else {
                node.children_ids[mid + 1..].to_vec()
            },
        };

        if node.parent_id == NONE_ID {
            // N is the root: rewrite it in place to hold just the split
            // key, with L and R as newly saved children pointing back.
            let left_id = self.save(&mut left)?;
            let right_id = self.save(&mut right)?;
            self.reparent_children_ids(&left.children_ids, left_id)?;
            self.reparent_children_ids(&right.children_ids, right_id)?;

            let mut root = node;
            root.keys = vec![split_key];
            root.contents = vec![split_content];
            root.children_ids = vec![left_id, right_id];
            self.save(&mut root)?;
            return Ok(());
        }

        // Reuse N's slot for L (stability: outside references to N's id
        // keep working, now pointing at L).
        left.id = node.id;
        self.save(&mut left)?;
        self.reparent_children_ids(&left.children_ids, left.id)?;
        let right_id = self.save(&mut right)?;
        self.reparent_children_ids(&right.children_ids, right_id)?;

        let mut parent = self.load(node.parent_id)?;
        let child_pos = parent
            .children_ids
            .iter()
            .position(|&c| c == left.id)
            .ok_or_else(|| IndexError::IndexCorrupt {
                reason: format!("node {} not found among parent {}'s children", left.id, parent.id),
            })?;
        parent.children_ids.remove(child_pos);

        let mut kpos = 0;
        while kpos < parent.keys.len() && parent.keys[kpos].compare(&split_key) != Ordering::Greater
        {
            kpos += 1;
        }
        parent.keys.insert(kpos, split_key);
        parent.contents.insert(kpos, split_content);
        parent.children_ids.insert(kpos, left.id);
        parent.children_ids.insert(kpos + 1, right_id);
        self.save(&mut parent)?;

        if parent.keys.len() > keys_size {
            self.split(parent.id)?;
        }
        Ok(())
    }

    // ---- delete ---------------------------------------------------------

    /// Remove one `(key, content)` pair. Returns `true` iff a matching
    /// pair was found and removed.
    pub fn delete(&mut self, key: &Value, content: i64) -> IndexResult<bool> {
        match self.locate_key_content(self.root_id, key, content)? {
            Some((node_id, pos)) => {
                self.delete_at(node_id, pos)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn locate_key_content(
        &self,
        node_id: i64,
        key: &Value,
        content: i64,
    ) -> IndexResult<Option<(i64, usize)>> {
        let node = self.load(node_id)?;
        let m = node.keys.len();

        let mut i = 0;
        while i < m && key.compare(&node.keys[i]) == Ordering::Greater {
            i += 1;
        }
        let mut j = i;
        while j < m && key.compare(&node.keys[j]) == Ordering::Equal {
            if node.contents[j] == content {
                return Ok(Some((node.id, j)));
            }
            j += 1;
        }

        if node.is_leaf() {
            return Ok(None);
        }
        for child_pos in i..=j {
            if let Some(&child_id) = node.children_ids.get(child_pos) {
                if let Some(found) = self.locate_key_content(child_id, key, content)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    fn delete_at(&mut self, node_id: i64, pos: usize) -> IndexResult<()> {
        let node = self.load(node_id)?;
        if node.is_leaf() {
            self.delete_leaf_entry(node_id, pos)
        } else {
            self.delete_internal_entry(node_id, pos)
        }
    }

    fn delete_leaf_entry(&mut self, node_id: i64, pos: usize) -> IndexResult<()> {
        let mut node = self.load(node_id)?;
        node.keys.remove(pos);
        node.contents.remove(pos);
        self.save(&mut node)?;
        if node.parent_id == NONE_ID {
            return Ok(());
        }
        self.rebalance_after_underflow(node.id)
    }

    /// Replace the target pair (an internal-node entry) with a neighbour
    /// drawn from the subtree: predecessor borrow, else successor
    /// borrow, else merge the two adjacent children.
    fn delete_internal_entry(&mut self, node_id: i64, pos: usize) -> IndexResult<()> {
        let node = self.load(node_id)?;
        let left_child_id = node.children_ids.get(pos).copied();
        let right_child_id = node.children_ids.get(pos + 1).copied();

        if let Some(left_id) = left_child_id {
            let (leaf_id, mut leaf) = self.rightmost_leaf(left_id)?;
            if !leaf.keys.is_empty() {
                let pred_key = leaf.keys.pop().unwrap();
                let pred_content = leaf.contents.pop().unwrap();
                let mut node = self.load(node_id)?;
                node.keys[pos] = pred_key;
                node.contents[pos] = pred_content;
                self.save(&mut node)?;
                self.save(&mut leaf)?;
                return self.rebalance_after_underflow(leaf_id);
            }
        }

        if let Some(right_id) = right_child_id {
            let (leaf_id, mut leaf) = self.leftmost_leaf(right_id)?;
            if !leaf.keys.is_empty() {
                let succ_key = leaf.keys.remove(0);
                let succ_content = leaf.contents.remove(0);
                let mut node = self.load(node_id)?;
                node.keys[pos] = succ_key;
                node.contents[pos] = succ_content;
                self.save(&mut node)?;
                self.save(&mut leaf)?;
                return self.rebalance_after_underflow(leaf_id);
            }
        }

        // Neither subtree has a usable neighbour: merge them, dropping
        // the target key and its now-redundant child pointer.
        self.merge_children(node_id, pos)?;
        self.rebalance_after_underflow(node_id)
    }

    fn rightmost_leaf(&self, node_id: i64) -> IndexResult<(i64, Node)> {
        let mut node = self.load(node_id)?;
        while !node.is_leaf() {
            let next = *node.children_ids.last().unwrap();
            node = self.load(next)?;
        }
        Ok((node.id, node))
    }

    fn leftmost_leaf(&self, node_id: i64) -> IndexResult<(i64, Node)> {
        let mut node = self.load(node_id)?;
        while !node.is_leaf() {
            node = self.load(node.children_ids[0])?;
        }
        Ok((node.id, node))
    }

    /// Merge `parent.children_ids[left_pos]` and `[left_pos + 1]`,
    /// pulling the separator down from the parent. The right child's
    /// keys/contents/children are concatenated onto the left, as plain
    /// B-tree merging requires, not appended as a single nested element.
    fn merge_children(&mut self, parent_id: i64, left_pos: usize) -> IndexResult<()> {
        let mut parent = self.load(parent_id)?;
        let left_id = parent.children_ids[left_pos];
        let right_id = parent.children_ids[left_pos + 1];
        let mut left = self.load(left_id)?;
        let right = self.load(right_id)?;

        let sep_key = parent.keys.remove(left_pos);
        let sep_content = parent.contents.remove(left_pos);
        parent.children_ids.remove(left_pos + 1);

        left.keys.push(sep_key);
        left.contents.push(sep_content);
        left.keys.extend(right.keys.iter().cloned());
        left.contents.extend(right.contents.iter().cloned());
        left.children_ids.extend(right.children_ids.iter().cloned());

        self.save(&mut left)?;
        self.reparent_children_ids(&right.children_ids, left.id)?;
        self.nodes.delete_node(right.id)?;
        self.save(&mut parent)?;
        Ok(())
    }

    fn borrow_from_left(&mut self, parent_id: i64, child_pos: usize) -> IndexResult<()> {
        let mut parent = self.load(parent_id)?;
        let sep_pos = child_pos - 1;
        let mut left = self.load(parent.children_ids[sep_pos])?;
        let mut node = self.load(parent.children_ids[child_pos])?;

        node.keys.insert(0, parent.keys[sep_pos].clone());
        node.contents.insert(0, parent.contents[sep_pos]);

        if !left.children_ids.is_empty() {
            let moved = left.children_ids.pop().unwrap();
            node.children_ids.insert(0, moved);
            let mut moved_node = self.load(moved)?;
            moved_node.parent_id = node.id;
            self.save(&mut moved_node)?;
        }

        parent.keys[sep_pos] = left.keys.pop().unwrap();
        parent.contents[sep_pos] = left.contents.pop().unwrap();

        self.save(&mut left)?;
        self.save(&mut node)?;
        self.save(&mut parent)?;
        Ok(())
    }

    fn borrow_from_right(&mut self, parent_id: i64, child_pos: usize) -> IndexResult<()> {
        let mut parent = self.load(parent_id)?;
        let sep_pos = child_pos;
        let mut right = self.load(parent.children_ids[child_pos + 1])?;
        let mut node = self.load(parent.children_ids[child_pos])?;

        node.keys.push(parent.keys[sep_pos].clone());
        node.contents.push(parent.contents[sep_pos]);

        if !right.children_ids.is_empty() {
            let moved = right.children_ids.remove(0);
            node.children_ids.push(moved);
            let mut moved_node = self.load(moved)?;
            moved_node.parent_id = node.id;
            self.save(&mut moved_node)?;
        }

        parent.keys[sep_pos] = right.keys.remove(0);
        parent.contents[sep_pos] = right.contents.remove(0);

        self.save(&mut right)?;
        self.save(&mut node)?;
        self.save(&mut parent)?;
        Ok(())
    }

    fn collapse_root(&mut self, root_id: i64) -> IndexResult<()> {
        let root = self.load(root_id)?;
        let child_id = root.children_ids[0];
        let mut child = self.load(child_id)?;
        let grandchildren = child.children_ids.clone();

        child.id = root_id;
        child.parent_id = NONE_ID;
        self.save(&mut child)?;
        self.reparent_children_ids(&grandchildren, root_id)?;
        self.nodes.delete_node(child_id)?;
        Ok(())
    }

    /// Borrow from a sibling if one has slack; otherwise merge, then
    /// recurse upward. At the root, only the collapse condition (zero
    /// keys, one child) is handled — the root is otherwise exempt from
    /// the minimum-key invariant.
    fn rebalance_after_underflow(&mut self, node_id: i64) -> IndexResult<()> {
        let node = self.load(node_id)?;
        if node.parent_id == NONE_ID {
            if node.keys.is_empty() && node.children_ids.len() == 1 {
                self.collapse_root(node.id)?;
            }
            return Ok(());
        }
        if node.keys.len() >= self.min_keys() {
            return Ok(());
        }

        let parent = self.load(node.parent_id)?;
        let child_pos = parent
            .children_ids
            .iter()
            .position(|&c| c == node.id)
            .ok_or_else(|| IndexError::IndexCorrupt {
                reason: format!("node {} not found among parent {}'s children", node.id, parent.id),
            })?;

        if child_pos > 0 {
            let left = self.load(parent.children_ids[child_pos - 1])?;
            if left.keys.len() > self.min_keys() {
                return self.borrow_from_left(parent.id, child_pos);
            }
        }
        if child_pos + 1 < parent.children_ids.len() {
            let right = self.load(parent.children_ids[child_pos + 1])?;
            if right.keys.len() > self.min_keys() {
                return self.borrow_from_right(parent.id, child_pos);
            }
        }

        if child_pos > 0 {
            self.merge_children(parent.id, child_pos - 1)?;
        } else {
            self.merge_children(parent.id, child_pos)?;
        }
        self.rebalance_after_underflow(parent.id)
    }

    /// Remove every file backing this index.
    pub fn drop(self) -> IndexResult<()> {
        let directory = self.config.directory.clone();
        self.nodes.destroy()?;
        self.metadata.destroy()?;
        drop(self._lock);
        let _ = std::fs::remove_file(directory.join("write.lock"));
        let _ = std::fs::remove_dir(&directory);
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
