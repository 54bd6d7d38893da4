//! SQL script artifact.
//!
//! Every run that produces statements overwrites one script file with the
//! full ordered statement list.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::Result;
use crate::statement::Statement;

/// Script file name inside the script directory.
pub const SCRIPT_FILE_NAME: &str = "schema.sql";

/// Writes the generated statements to `<project>/<script_dir>/schema.sql`.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    path: PathBuf,
}

impl ScriptWriter {
    /// Creates a writer for `<project_dir>/<script_dir>/schema.sql`.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>, script_dir: impl AsRef<Path>) -> Self {
        Self {
            path: project_dir
                .as_ref()
                .join(script_dir.as_ref())
                .join(SCRIPT_FILE_NAME),
        }
    }

    /// Returns the script path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the script text: a timestamp header, then each statement
    /// followed by a blank line.
    #[must_use]
    pub fn render(statements: &[Statement], generated_at: DateTime<Local>) -> String {
        let mut out = format!(
            "-- Generated by tablesync at {}\n\n",
            generated_at.format("%Y-%m-%d %H:%M:%S %:z")
        );
        for stmt in statements {
            out.push_str(&stmt.sql);
            out.push_str("\n\n");
        }
        out
    }

    /// Overwrites the script with `statements`, creating the directory if
    /// needed. Returns the path written.
    pub fn write(&self, statements: &[Statement]) -> Result<&Path> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                info!(dir = %dir.display(), "Creating SQL script directory");
                std::fs::create_dir_all(dir)?;
            }
        }

        std::fs::write(&self.path, Self::render(statements, Local::now()))?;
        info!(
            path = %self.path.display(),
            statements = statements.len(),
            "SQL script saved"
        );
        Ok(&self.path)
    }
}
