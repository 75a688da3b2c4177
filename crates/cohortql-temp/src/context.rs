//! Per-compilation tree context.

use std::collections::BTreeSet;

use cohortql_core::config::CompileConfig;
use cohortql_core::error::Result;

use crate::manager::TempTableManager;

/// State shared by every node of one compiled tree.
///
/// Created once per compilation and dropped with it. Evaluation only reads it
/// (`&TreeContext`); the temp-table build phase is the only writer
/// (`&mut TreeContext`), which keeps registry mutation exclusive.
#[derive(Debug, Default)]
pub struct TreeContext {
    person_ids: Option<BTreeSet<i64>>,
    temp_tables: TempTableManager,
}

impl TreeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &CompileConfig) -> Result<Self> {
        cfg.validate()?;
        let mut ctx = Self {
            person_ids: None,
            temp_tables: TempTableManager::new(
                cfg.temp_table_prefix.clone(),
                cfg.drop_existing_temp_tables,
            ),
        };
        if let Some(ids) = &cfg.person_ids {
            ctx = ctx.with_person_ids(ids.iter().copied());
        }
        Ok(ctx)
    }

    pub fn with_person_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.person_ids = Some(ids.into_iter().collect());
        self
    }

    /// The allowlist, if one was given and it is non-empty.
    pub fn person_ids(&self) -> Option<&BTreeSet<i64>> {
        self.person_ids.as_ref().filter(|ids| !ids.is_empty())
    }

    pub fn temp_tables(&self) -> &TempTableManager {
        &self.temp_tables
    }

    pub fn temp_tables_mut(&mut self) -> &mut TempTableManager {
        &mut self.temp_tables
    }
}
