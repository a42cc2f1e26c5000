//! The catalog: routes command descriptors to tables and indexes.

use opal_common::{EngineConfig, OpalError, Result, Value};
use std::collections::HashMap;
use tracing::info;

use crate::command::Command;
use crate::schema::Schema;
use crate::table::Table;

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// DDL completed with nothing to report.
    None,
    /// The row id assigned by an insert.
    RowId(u32),
    /// A result set with its effective column names.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// Number of rows an update or delete touched.
    Affected(usize),
}

/// The set of live tables, addressed by name.
///
/// File naming, directory layout, and byte persistence stay with the caller;
/// the catalog owns only the in-memory lifecycle and the name-resolution
/// error contract.
pub struct Catalog {
    tables: HashMap<String, Table>,
    config: EngineConfig,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tables: HashMap::new(),
            config,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up a table.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| OpalError::TableNotFound(name.to_string()))
    }

    /// Looks up a table mutably.
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| OpalError::TableNotFound(name.to_string()))
    }

    /// Adopts an already constructed table (e.g. one loaded from pages).
    pub fn adopt(&mut self, table: Table) -> Result<()> {
        let name = table.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(OpalError::TableAlreadyExists(name));
        }
        self.tables.insert(name, table);
        Ok(())
    }

    /// Executes one command against the catalog.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutput> {
        match command {
            Command::CreateTable { table, columns } => {
                if self.tables.contains_key(&table) {
                    return Err(OpalError::TableAlreadyExists(table));
                }
                info!(table = %table, "create table");
                let created = Table::create(&table, Schema::new(columns), &self.config);
                self.tables.insert(table, created);
                Ok(CommandOutput::None)
            }
            Command::DropTable { table } => {
                if self.tables.remove(&table).is_none() {
                    return Err(OpalError::TableNotFound(table));
                }
                info!(table = %table, "drop table");
                Ok(CommandOutput::None)
            }
            Command::CreateIndex { table, column } => {
                info!(table = %table, column = %column, "create index");
                self.table_mut(&table)?.create_index(&column)?;
                Ok(CommandOutput::None)
            }
            Command::DropIndex { table, column } => {
                info!(table = %table, column = %column, "drop index");
                self.table_mut(&table)?.drop_index(&column)?;
                Ok(CommandOutput::None)
            }
            Command::Insert {
                table,
                columns,
                values,
            } => {
                let row_id = self.table_mut(&table)?.insert(&columns, &values)?;
                Ok(CommandOutput::RowId(row_id))
            }
            Command::Select {
                table,
                columns,
                condition,
            } => {
                let (columns, rows) = self.table(&table)?.select(&columns, condition.as_ref())?;
                Ok(CommandOutput::Rows { columns, rows })
            }
            Command::Update {
                table,
                set,
                condition,
            } => {
                let affected = self.table_mut(&table)?.update(&set, condition.as_ref())?;
                Ok(CommandOutput::Affected(affected))
            }
            Command::Delete { table, condition } => {
                let affected = self.table_mut(&table)?.delete(condition.as_ref())?;
                Ok(CommandOutput::Affected(affected))
            }
        }
    }
}
