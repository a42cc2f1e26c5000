//! Storage engine for OpalDB.
//!
//! This crate provides:
//! - Typed row records with a variable-length cell encoding
//! - Slotted fixed-size pages and their binary codec
//! - A classic B-tree and a linked-leaf B+tree over arena-stored nodes
//! - Tables with schema validation, constraint checks, and CRUD
//! - Secondary indexes rebuilt from full table scans
//! - A catalog routing structured command descriptors

pub mod btree;
pub mod catalog;
pub mod command;
pub mod index;
pub mod page;
pub mod record;
pub mod schema;
pub mod table;

pub use btree::{BalancedTree, Keyed, OrderedTree, MIN_DEGREE};
pub use catalog::{Catalog, CommandOutput};
pub use command::{Command, Comparator, Condition, Literal, SetClause};
pub use index::Index;
pub use page::{DataCell, InteriorPage, LeafPage, PageHeader, PageType, ROOT_PARENT};
pub use record::{Record, ResolvedCondition};
pub use schema::{ColumnDef, KeyRole, Schema};
pub use table::Table;
