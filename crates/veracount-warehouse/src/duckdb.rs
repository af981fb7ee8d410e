//! `DuckDB` connection setup.

use ::duckdb::Connection;

/// Open a private in-memory database for one refresh run.
///
/// The database never outlives the run, so there is nothing to pool or
/// persist between invocations.
///
/// # Errors
/// Returns an error if the engine cannot be started or configured.
pub fn open_in_memory() -> Result<Connection, ::duckdb::Error> {
    let connection = Connection::open_in_memory()?;
    configure_connection(&connection)?;
    Ok(connection)
}

/// Configure a database connection with appropriate settings.
///
/// # Errors
/// Returns an error if configuration SQL fails to execute.
fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_connection_answers_queries() {
        let connection = open_in_memory().expect("open");
        let value: i64 = connection
            .query_row("SELECT 40 + 2", [], |row| row.get(0))
            .expect("query");
        assert_eq!(value, 42);
    }
}
