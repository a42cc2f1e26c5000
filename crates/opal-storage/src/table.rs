//! Tables: schema-validated CRUD over an ordered row tree.

use bytes::{Bytes, BytesMut};
use opal_common::{DataType, EngineConfig, OpalError, Result, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::btree::{Keyed, OrderedTree};
use crate::command::{Condition, Literal, SetClause};
use crate::index::Index;
use crate::page::{InteriorPage, LeafPage, PageType, ROOT_PARENT};
use crate::record::{Record, ResolvedCondition};
use crate::schema::Schema;

/// A table: column schema, row tree, row-id allocator, and its indexes.
///
/// Row ids are handed out monotonically and never reused; a deleted id moves
/// into the tombstone set. Every write rebuilds the attached indexes from a
/// fresh scan of the row tree.
pub struct Table {
    name: String,
    schema: Schema,
    tree: OrderedTree<Record>,
    next_row_id: u32,
    tombstones: HashSet<u32>,
    indexes: HashMap<String, Index>,
    page_size: usize,
    min_degree: usize,
    max_record_size: usize,
}

impl Table {
    /// Creates an empty table over the given schema.
    pub fn create(name: &str, schema: Schema, config: &EngineConfig) -> Self {
        let min_degree = config.effective_min_degree();
        debug!(table = name, columns = schema.width(), "creating table");
        Self {
            name: name.to_string(),
            schema,
            tree: OrderedTree::new(min_degree),
            next_row_id: 0,
            tombstones: HashSet::new(),
            indexes: HashMap::new(),
            page_size: config.page_size,
            min_degree,
            max_record_size: config.max_record_size(),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the next row id to be assigned.
    pub fn next_row_id(&self) -> u32 {
        self.next_row_id
    }

    /// Returns the tombstoned row ids.
    pub fn tombstones(&self) -> &HashSet<u32> {
        &self.tombstones
    }

    /// Returns the number of live rows.
    pub fn row_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns the tree's minimum degree.
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Returns the page size this table serializes with.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Iterates live rows in ascending row-id order (tombstones skipped).
    pub fn rows(&self) -> impl Iterator<Item = &Keyed<Record>> {
        self.tree
            .iter()
            .filter(move |e| !self.tombstones.contains(&e.key))
    }

    /// Returns the index attached to `column`, if any.
    pub fn index(&self, column: &str) -> Option<&Index> {
        self.indexes.get(column)
    }

    /// Builds and attaches an index on `column`.
    pub fn create_index(&mut self, column: &str) -> Result<()> {
        if self.indexes.contains_key(column) {
            return Err(OpalError::IndexAlreadyExists {
                table: self.name.clone(),
                column: column.to_string(),
            });
        }
        let index = Index::build(self, column)?;
        self.indexes.insert(column.to_string(), index);
        Ok(())
    }

    /// Detaches the index on `column`.
    pub fn drop_index(&mut self, column: &str) -> Result<()> {
        self.indexes.remove(column).map(|_| ()).ok_or_else(|| {
            OpalError::IndexNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            }
        })
    }

    /// Inserts a row and returns its assigned id.
    ///
    /// `columns` names the provided values (empty = positional over the full
    /// schema); unnamed columns become null. Every value is validated before
    /// the tree is touched.
    pub fn insert(&mut self, columns: &[String], values: &[Literal]) -> Result<u32> {
        let expanded = self.expand_values(columns, values)?;

        let mut coerced = Vec::with_capacity(expanded.len());
        for (order, literal) in expanded.iter().enumerate() {
            let value = self.schema.coerce(order, literal)?;
            self.check_unique(order, &value)?;
            coerced.push(value);
        }

        let types: Vec<DataType> = coerced.iter().map(Value::data_type).collect();
        let record = Record::new(self.next_row_id, self.schema.width() as u8, types, coerced);
        if record.encoded_len() > self.max_record_size {
            return Err(OpalError::RecordTooLarge {
                size: record.encoded_len(),
                max: self.max_record_size,
            });
        }

        let row_id = self.next_row_id;
        self.tree.insert(Keyed::new(row_id, record));
        self.next_row_id += 1;
        self.rebuild_indexes()?;
        debug!(table = %self.name, row_id, "inserted row");
        Ok(row_id)
    }

    /// Selects rows matching the condition, projected onto the requested
    /// columns (empty = all). Returns the effective column name list and a
    /// de-duplicated, unordered row set.
    pub fn select(
        &self,
        columns: &[String],
        condition: Option<&Condition>,
    ) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        let orders = self.schema.column_orders(columns)?;
        let resolved = condition.map(|c| self.resolve_condition(c)).transpose()?;

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for record in self.candidate_records(resolved.as_ref()) {
            if let Some(cond) = &resolved {
                if !record.matches(cond) {
                    continue;
                }
            }
            let row: Vec<Value> = orders
                .iter()
                .map(|&o| record.values.get(o).cloned().unwrap_or(Value::Null))
                .collect();
            if !rows.contains(&row) {
                rows.push(row);
            }
        }

        let names = if columns.is_empty() {
            self.schema.column_names()
        } else {
            columns.to_vec()
        };
        Ok((names, rows))
    }

    /// Updates one column of every row matching the condition. Returns the
    /// number of rows rewritten.
    pub fn update(&mut self, set: &SetClause, condition: Option<&Condition>) -> Result<usize> {
        let order = self.schema.column_order(&set.column)?;
        let new_value = self.schema.coerce(order, &set.value)?;
        self.check_unique(order, &new_value)?;
        let resolved = condition.map(|c| self.resolve_condition(c)).transpose()?;

        let matched: Vec<u32> = self
            .candidate_records(resolved.as_ref())
            .filter(|r| resolved.as_ref().map_or(true, |c| r.matches(c)))
            .map(Record::id)
            .collect();

        // Size-check every rewritten record before committing any of them.
        for &row_id in &matched {
            if let Some(record) = self.tree.get(row_id) {
                let mut updated = record.clone();
                updated.set_value(order, new_value.clone());
                if updated.encoded_len() > self.max_record_size {
                    return Err(OpalError::RecordTooLarge {
                        size: updated.encoded_len(),
                        max: self.max_record_size,
                    });
                }
            }
        }

        for &row_id in &matched {
            if let Some(record) = self.tree.get_mut(row_id) {
                record.set_value(order, new_value.clone());
            }
        }
        self.rebuild_indexes()?;
        debug!(table = %self.name, rows = matched.len(), column = %set.column, "updated rows");
        Ok(matched.len())
    }

    /// Deletes matching rows; no condition clears the whole table. Deleted
    /// ids become tombstones and are never reassigned.
    pub fn delete(&mut self, condition: Option<&Condition>) -> Result<usize> {
        let Some(condition) = condition else {
            let dropped = self.tree.len();
            self.tree = OrderedTree::new(self.min_degree);
            self.rebuild_indexes()?;
            debug!(table = %self.name, rows = dropped, "cleared table");
            return Ok(dropped);
        };

        let resolved = self.resolve_condition(condition)?;
        let doomed: Vec<u32> = self
            .candidate_records(Some(&resolved))
            .filter(|r| r.matches(&resolved))
            .map(Record::id)
            .collect();

        for &row_id in &doomed {
            self.tree.delete(row_id);
            self.tombstones.insert(row_id);
        }
        self.rebuild_indexes()?;
        debug!(table = %self.name, rows = doomed.len(), "deleted rows");
        Ok(doomed.len())
    }

    /// Returns the leaf holding the first live row, probing ids from 0.
    pub fn first_leaf(&self) -> Option<usize> {
        for row_id in 0..self.next_row_id {
            if self.tombstones.contains(&row_id) {
                continue;
            }
            if let Some((leaf, _)) = self.tree.search(row_id) {
                return Some(leaf);
            }
        }
        None
    }

    /// Serializes the row tree into a sequence of fixed-size pages.
    ///
    /// Pages are numbered pre-order (a node before its subtrees, children in
    /// consecutive subtree blocks) and written at `page_number * page_size`.
    /// Leaf right pointers name the next same-parent sibling, 0 for the last.
    pub fn to_bytes(&self) -> Bytes {
        let mut pages: Vec<Option<Bytes>> = Vec::new();
        let total = self.serialize_node(self.tree.root(), 0, ROOT_PARENT, 0, &mut pages);
        debug!(table = %self.name, pages = total, "serialized table");

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

        let cells = self
            .tree
            .routers(node)
            .iter()
            .zip(&child_pages)
            .map(|(&routing_key, &child_page)| crate::page::DataCell {
                routing_key,
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

    /// Rebuilds a table from its page image.
    ///
    /// Only table-leaf pages are consulted; their records replay in row-id
    /// order through fresh inserts. Tombstones reset to empty.
    pub fn from_bytes(
        bytes: &[u8],
        name: &str,
        schema: Schema,
        next_row_id: u32,
        config: &EngineConfig,
    ) -> Result<Table> {
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
        debug!(table = name, rows = records.len(), "loaded table pages");

        let mut table = Table::create(name, schema, config);
        for record in records {
            table.tree.insert(Keyed::new(record.row_id, record));
        }
        table.next_row_id = next_row_id;
        Ok(table)
    }

    /// Expands a named (or positional) value list to full schema order,
    /// filling unnamed columns with null.
    fn expand_values(&self, columns: &[String], values: &[Literal]) -> Result<Vec<Literal>> {
        if columns.is_empty() {
            let mut expanded = values.to_vec();
            expanded.resize(self.schema.width(), Literal::Null);
            return Ok(expanded);
        }

        let orders = self.schema.column_orders(columns)?;
        let mut expanded = vec![Literal::Null; self.schema.width()];
        for (order, literal) in orders.into_iter().zip(values) {
            expanded[order] = literal.clone();
        }
        Ok(expanded)
    }

    /// Resolves a raw condition: column position, negation folded into the
    /// comparator, value coerced to the column's type.
    fn resolve_condition(&self, condition: &Condition) -> Result<ResolvedCondition> {
        let column_order = self.schema.column_order(&condition.column)?;
        let value = self.schema.coerce(column_order, &condition.value)?;
        let comparator = if condition.negated {
            condition.comparator.negate()
        } else {
            condition.comparator
        };
        Ok(ResolvedCondition {
            column_order,
            comparator,
            value,
        })
    }

    /// Rows to evaluate a condition against: the first index leaf when the
    /// condition targets an indexed column, else the full leaf chain.
    fn candidate_records<'a>(
        &'a self,
        resolved: Option<&ResolvedCondition>,
    ) -> Box<dyn Iterator<Item = &'a Record> + 'a> {
        if let Some(cond) = resolved {
            let column = &self.schema.columns()[cond.column_order].name;
            if let Some(index) = self.indexes.get(column) {
                let ids: Vec<u32> = index
                    .first_leaf_entries()
                    .map(|entries| entries.iter().map(|e| e.key).collect())
                    .unwrap_or_default();
                return Box::new(
                    ids.into_iter()
                        .filter_map(move |id| self.tree.get(id))
                        .filter(move |r| !self.tombstones.contains(&r.row_id)),
                );
            }
        }
        Box::new(self.rows().map(|e| &e.data))
    }

    /// Scans for an existing value in a unique column; a hit is a constraint
    /// violation. Null never collides.
    fn check_unique(&self, column_order: usize, value: &Value) -> Result<()> {
        let column = &self.schema.columns()[column_order];
        if !column.key_role.is_unique() || value.is_null() {
            return Ok(());
        }
        let clash = self
            .rows()
            .any(|e| e.data.values.get(column_order) == Some(value));
        if clash {
            return Err(OpalError::ConstraintViolation {
                column: column.name.clone(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    /// Discards and rebuilds every attached index from a full table scan.
    fn rebuild_indexes(&mut self) -> Result<()> {
        if self.indexes.is_empty() {
            return Ok(());
        }
        let columns: Vec<String> = self.indexes.keys().cloned().collect();
        let mut rebuilt = HashMap::with_capacity(columns.len());
        for column in columns {
            let index = Index::build(self, &column)?;
            rebuilt.insert(column, index);
        }
        self.indexes = rebuilt;
        Ok(())
    }
}
