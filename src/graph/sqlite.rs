//! Sqlite-backed graph store.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{migrate, open_connection};
use crate::error::Result;
use crate::graph::{Edge, GraphStore, Node};

/// Persistent graph store. The `(source_id, target_id)` primary key and
/// `INSERT OR IGNORE` give the first writer of a node or pair the win.
pub struct SqliteGraph {
    conn: Connection,
}

impl SqliteGraph {
    /// Open (or create) the graph database and apply pending migrations
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let mut conn = open_connection(db_path)?;
        migrate::run_migrations(&mut conn)?;
        Ok(Self { conn })
    }
}

impl GraphStore for SqliteGraph {
    fn node_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn edge_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn node(&self, id: &str) -> Result<Option<Node>> {
        let node = self
            .conn
            .query_row(
                "SELECT id, display_name, type_tag FROM nodes WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Node {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        type_tag: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(node)
    }

    fn add_node(&mut self, node: Node) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO nodes (id, display_name, type_tag) VALUES (?1, ?2, ?3)",
            params![node.id, node.display_name, node.type_tag],
        )?;
        Ok(changed > 0)
    }

    fn edge(&self, source_id: &str, target_id: &str) -> Result<Option<Edge>> {
        let edge = self
            .conn
            .query_row(
                "SELECT source_id, target_id, relation_label, attributes FROM edges \
                 WHERE source_id = ?1 AND target_id = ?2",
                params![source_id, target_id],
                |row| {
                    Ok(Edge {
                        source_id: row.get(0)?,
                        target_id: row.get(1)?,
                        relation_label: row.get(2)?,
                        attributes: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(edge)
    }

    fn add_edge(&mut self, edge: Edge) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO edges (source_id, target_id, relation_label, attributes) \
             VALUES (?1, ?2, ?3, ?4)",
            params![edge.source_id, edge.target_id, edge.relation_label, edge.attributes],
        )?;
        Ok(changed > 0)
    }

    fn successors(&self, id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT target_id FROM edges WHERE source_id = ?1 ORDER BY rowid")?;
        let targets = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(targets)
    }
}
