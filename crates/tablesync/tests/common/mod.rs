#![allow(dead_code)]

//! In-memory catalog that executes the DDL the MySQL dialect emits.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use tablesync::prelude::*;

type Table = BTreeMap<String, ObservedColumn>;

/// Shared state behind every connection the fake hands out.
#[derive(Default)]
struct State {
    tables: RefCell<BTreeMap<String, Table>>,
    batches: RefCell<Vec<Vec<Statement>>>,
    connects: Cell<usize>,
    closes: Cell<usize>,
    fail_execute: Cell<bool>,
}

/// A [`Connector`] backed by an in-memory catalog.
#[derive(Clone, Default)]
pub struct MemoryDb {
    state: Rc<State>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table as `(name, type, comment)` triples.
    pub fn with_table(self, name: &str, columns: &[(&str, &str, &str)]) -> Self {
        let table = columns
            .iter()
            .map(|(n, t, c)| (n.to_lowercase(), ObservedColumn::new(*n, *t, *c)))
            .collect();
        self.state.tables.borrow_mut().insert(name.to_string(), table);
        self
    }

    pub fn fail_execute(self) -> Self {
        self.state.fail_execute.set(true);
        self
    }

    pub fn columns_of(&self, table: &str) -> Vec<ObservedColumn> {
        self.state
            .tables
            .borrow()
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.state.tables.borrow().contains_key(table)
    }

    pub fn batches(&self) -> Vec<Vec<Statement>> {
        self.state.batches.borrow().clone()
    }

    pub fn connects(&self) -> usize {
        self.state.connects.get()
    }

    pub fn closes(&self) -> usize {
        self.state.closes.get()
    }

    fn apply(&self, stmt: &Statement) {
        let mut tables = self.state.tables.borrow_mut();
        match stmt.kind {
            StatementKind::Create => {
                let body = between(&stmt.sql, "(\n", "\n)");
                let table: Table = body
                    .lines()
                    .map(|line| line.trim().trim_end_matches(','))
                    .filter(|line| !line.starts_with("PRIMARY KEY"))
                    .map(parse_definition)
                    .map(|col| (col.db_name.to_lowercase(), col))
                    .collect();
                tables.entry(stmt.table.clone()).or_insert(table);
            }
            StatementKind::Add | StatementKind::Modify => {
                let def = stmt
                    .sql
                    .split_once(" COLUMN ")
                    .map(|(_, rest)| rest.trim_end_matches(';'))
                    .unwrap_or_else(|| panic!("no column definition in: {}", stmt.sql));
                let col = parse_definition(def);
                let table = tables
                    .get_mut(&stmt.table)
                    .unwrap_or_else(|| panic!("ALTER on missing table {}", stmt.table));
                table.insert(col.db_name.to_lowercase(), col);
            }
            StatementKind::Drop => {
                let column = stmt.column.as_deref().unwrap_or_default();
                if let Some(table) = tables.get_mut(&stmt.table) {
                    table.remove(&column.to_lowercase());
                }
            }
        }
    }
}

/// Parses "`name` TYPE [modifiers] COMMENT 'text'" into the column the
/// catalog would report.
fn parse_definition(def: &str) -> ObservedColumn {
    let name = between(def, "`", "`").replace("``", "`");
    let rest = def[name.len() + 2..].trim_start();
    let (ty, comment) = rest
        .split_once(" COMMENT '")
        .unwrap_or_else(|| panic!("no comment in: {def}"));
    let ty = ty.split_whitespace().next().unwrap_or_default();
    let comment = comment
        .trim_end_matches('\'')
        .replace("''", "'")
        .replace("\\\\", "\\");
    ObservedColumn::new(name, ty.to_lowercase(), comment)
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> &'a str {
    let start = s.find(open).map(|i| i + open.len()).unwrap_or(0);
    let end = s[start..].find(close).map_or(s.len(), |i| start + i);
    &s[start..end]
}

pub struct MemoryConnection {
    db: MemoryDb,
}

impl SchemaIntrospector for MemoryConnection {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        Ok(self.db.has_table(table))
    }

    async fn columns(&mut self, table: &str) -> Result<BTreeMap<String, ObservedColumn>> {
        Ok(self
            .db
            .state
            .tables
            .borrow()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }
}

impl BatchExecutor for MemoryConnection {
    async fn execute_batch(&mut self, statements: &[Statement]) -> Result<()> {
        if self.db.state.fail_execute.get() {
            return Err(SyncError::Database(sqlx::Error::Protocol(
                "You have an error in your SQL syntax".to_string(),
            )));
        }
        for stmt in statements {
            self.db.apply(stmt);
        }
        self.db.state.batches.borrow_mut().push(statements.to_vec());
        Ok(())
    }
}

impl Connector for MemoryDb {
    type Connection = MemoryConnection;

    async fn connect(&self, _config: &DatabaseConfig) -> Result<MemoryConnection> {
        self.state.connects.set(self.state.connects.get() + 1);
        Ok(MemoryConnection { db: self.clone() })
    }

    async fn close(&self, _connection: MemoryConnection) -> Result<()> {
        self.state.closes.set(self.state.closes.get() + 1);
        Ok(())
    }
}

pub fn database() -> DatabaseConfig {
    DatabaseConfig::new("com.mysql.cj.jdbc.Driver", "jdbc:mysql://localhost:3306/app")
        .credentials("app", "secret")
}

pub fn synchronizer(db: &MemoryDb, project_dir: &Path) -> Synchronizer<MemoryDb> {
    Synchronizer::new(db.clone(), MySqlDialect::new())
        .database(Some(database()))
        .script_writer(ScriptWriter::new(project_dir, "sql"))
}
