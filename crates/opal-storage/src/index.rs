//! Secondary indexes: a balanced tree of single-column records.

use bytes::{Bytes, BytesMut};
use opal_common::{EngineConfig, OpalError, Result, Value};
use tracing::debug;

use crate::btree::{BalancedTree, Keyed};
use crate::page::{DataCell, InteriorPage, LeafPage, PageType, ROOT_PARENT};
use crate::record::Record;
use crate::table::Table;

/// An index over one table column.
///
/// Each entry is a single-column record holding the indexed column's value,
/// keyed by the source row's id (not by the value). The index is never
/// maintained incrementally: every table write discards and rebuilds it from
/// a full leaf-chain scan.
pub struct Index {
    column: String,
    tree: BalancedTree<Record>,
    entry_count: u32,
    /// The owning table's id allocator at build time; bounds the probe in
    /// [`Index::first_leaf_entries`].
    id_ceiling: u32,
    page_size: usize,
}

impl Index {
    /// Builds an index over `column` by scanning the table's live rows in
    /// ascending row-id order.
    pub fn build(table: &Table, column: &str) -> Result<Index> {
        let order = table.schema().column_order(column)?;
        let mut tree = BalancedTree::new(table.min_degree());
        let mut entry_count = 0u32;

        for entry in table.rows() {
            let value = entry
                .data
                .values
                .get(order)
                .cloned()
                .unwrap_or(Value::Null);
            let record = Record::new(entry.key, 1, vec![value.data_type()], vec![value]);
            tree.insert(Keyed::new(entry.key, record));
            entry_count += 1;
        }
        debug!(table = table.name(), column, entries = entry_count, "built index");

        Ok(Index {
            column: column.to_string(),
            tree,
            entry_count,
            id_ceiling: table.next_row_id(),
            page_size: table.page_size(),
        })
    }

    /// Returns the indexed column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the number of entries at the last rebuild.
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Returns the entries of the node holding the lowest present row id,
    /// probing ids upward from 0. This is the table's scan entry point.
    pub fn first_leaf_entries(&self) -> Option<&[Keyed<Record>]> {
        for row_id in 0..self.id_ceiling {
            if let Some((node, _)) = self.tree.search(row_id) {
                return Some(self.tree.entries(node));
            }
        }
        None
    }

    /// Serializes the index tree into fixed-size pages, exactly like a table.
    pub fn to_bytes(&self) -> Bytes {
        let mut pages: Vec<Option<Bytes>> = Vec::new();
        let total = self.serialize_node(self.tree.root(), 0, ROOT_PARENT, 0, &mut pages);
        debug!(column = %self.column, pages = total, "serialized index");

        let mut out = BytesMut::with_capacity(total as usize * self.page_size);
        for page in pages {
            out.extend_from_slice(&page.expect("every assigned page is written"));
        }
        out.freeze()
    }

    fn serialize_node(
        &self,
        node: usize,
        page_num: u32,
        parent: u32,
        next_leaf: u32,
        pages: &mut Vec<Option<Bytes>>,
    ) -> u32 {
        if pages.len() <= page_num as usize {
            pages.resize(page_num as usize + 1, None);
        }

        if self.tree.is_leaf(node) {
            let page = LeafPage {
                next_leaf,
                parent,
                records: self.tree.entries(node).iter().map(|e| e.data.clone()).collect(),
            };
            pages[page_num as usize] = Some(page.to_bytes(self.page_size));
            return page_num + 1;
        }

        let children = self.tree.children(node).to_vec();
        let mut child_pages = Vec::with_capacity(children.len());
        let mut next_free = page_num + 1;
        for (i, &child) in children.iter().enumerate() {
            child_pages.push(next_free);
            let sibling_hint = if i == children.len() - 1 { 0 } else { next_free + 1 };
            next_free = self.serialize_node(child, next_free, page_num, sibling_hint, pages);
        }

        // Interior entries route by id only; their payloads live nowhere
        // else on disk, so a reload keeps just the leaf entries.
        let cells = self
            .tree
            .entries(node)
            .iter()
            .zip(&child_pages)
            .map(|(entry, &child_page)| DataCell {
                routing_key: entry.key,
                child_page,
            })
            .collect();
        let page = InteriorPage {
            rightmost_child: *child_pages.last().expect("interior node has children"),
            parent,
            cells,
        };
        pages[page_num as usize] = Some(page.to_bytes(self.page_size));
        next_free
    }

    /// Rebuilds an index from its page image: leaf pages only, replayed in
    /// row-id order. Returns the index and its entry count.
    pub fn from_bytes(bytes: &[u8], column: &str, config: &EngineConfig) -> Result<(Index, u32)> {
        let page_size = config.page_size;
        if bytes.len() % page_size != 0 {
            return Err(OpalError::PageCorrupted {
                page_num: (bytes.len() / page_size) as u32,
                reason: "byte length is not a whole number of pages".to_string(),
            });
        }

        let mut records = Vec::new();
        for (page_num, chunk) in bytes.chunks(page_size).enumerate() {
            if chunk[0] == PageType::TableLeaf as u8 {
                let leaf = LeafPage::from_bytes(chunk, page_num as u32)?;
                records.extend(leaf.records);
            }
        }
        records.sort_by_key(Record::id);

        let mut tree = BalancedTree::new(config.effective_min_degree());
        let mut entry_count = 0u32;
        let mut id_ceiling = 0u32;
        for record in records {
            id_ceiling = id_ceiling.max(record.row_id + 1);
            tree.insert(Keyed::new(record.row_id, record));
            entry_count += 1;
        }

        Ok((
            Index {
                column: column.to_string(),
                tree,
                entry_count,
                id_ceiling,
                page_size,
            },
            entry_count,
        ))
    }
}
