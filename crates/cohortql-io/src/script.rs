//! Streaming SQL script writer.

use std::fs::File;
use std::io::{BufWriter, Write};

use cohortql_core::error::Result as CoreResult;
use cohortql_sql::{terminate, Dialect};
use cohortql_temp::Connection;

use crate::error::Result;

/// A connection that writes each executed statement to a script instead of
/// running it. Table columns come from the CDM catalog.
pub struct ScriptWriter<W: Write> {
    writer: BufWriter<W>,
    database_type: String,
    written: usize,
}

impl ScriptWriter<File> {
    pub fn to_path(path: &str, database_type: impl Into<String>) -> Result<Self> {
        let f = File::create(path)?;
        Ok(Self::to_writer(f, database_type))
    }
}

impl<W: Write> ScriptWriter<W> {
    pub fn to_writer(writer: W, database_type: impl Into<String>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            database_type: database_type.into(),
            written: 0,
        }
    }

    /// Append one statement with its terminator.
    pub fn write_statement(&mut self, sql: &str) -> Result<()> {
        let dialect = self.database_type.parse::<Dialect>().ok();
        writeln!(self.writer, "{}", terminate(sql, dialect))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

impl<W: Write> Connection for ScriptWriter<W> {
    fn database_type(&self) -> &str {
        &self.database_type
    }

    fn execute(&mut self, sql: &str) -> CoreResult<()> {
        self.write_statement(sql)?;
        Ok(())
    }
}
