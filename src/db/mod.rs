use rusqlite::Connection;
use std::path::Path;
use crate::error::Result;

pub mod migrate;

/// Open a sqlite connection with the pragmas the graph store relies on
pub fn open_connection<P: AsRef<Path>>(db_path: P) -> Result<Connection> {
    let conn = Connection::open(db_path.as_ref())?;

    // WAL for concurrent readers, NORMAL sync for speed, foreign keys so
    // edges cannot reference missing nodes
    conn.execute_batch(
        "PRAGMA journal_mode = WAL; \
         PRAGMA synchronous = NORMAL; \
         PRAGMA foreign_keys = ON; \
         PRAGMA temp_store = MEMORY;"
    )?;

    Ok(conn)
}
