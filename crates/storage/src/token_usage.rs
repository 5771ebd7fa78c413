// SPDX-License-Identifier: MIT

//! Token usage ledger (C3 `token_usage_mgr`): append-only accounting for
//! calls made to external LLM oracles elsewhere in the pipeline.

use crate::error::Result;
use crate::store::Store;
use chrono::{DateTime, Utc};
use rusqlite::params;

lt_core::define_row_id! {
    /// Primary key of a `token_usage` row.
    pub struct TokenUsageId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenUsage {
    pub id: TokenUsageId,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
    pub endpoint: String,
    pub feature_type: String,
    pub created_at: DateTime<Utc>,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

pub struct NewTokenUsage {
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub endpoint: String,
    pub feature_type: String,
    pub created_at: DateTime<Utc>,
    pub input_cost: f64,
    pub output_cost: f64,
}

/// Aggregate over a `[since, until)` window, keyed by `feature_type`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    pub calls: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
}

pub struct TokenUsageManager<'a> {
    store: &'a Store,
}

impl<'a> TokenUsageManager<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn append(&self, new: NewTokenUsage) -> Result<TokenUsageId> {
        let total_tokens = new.input_tokens + new.output_tokens;
        let total_cost = new.input_cost + new.output_cost;
        self.store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO token_usage (model, input_tokens, output_tokens, total_tokens, \
                 endpoint, feature_type, created_at, input_cost, output_cost, total_cost) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    new.model,
                    new.input_tokens,
                    new.output_tokens,
                    total_tokens,
                    new.endpoint,
                    new.feature_type,
                    new.created_at,
                    new.input_cost,
                    new.output_cost,
                    total_cost,
                ],
            )?;
            Ok(TokenUsageId::new(tx.last_insert_rowid()))
        })
    }

    /// Aggregate usage recorded at or after `since`, optionally narrowed to
    /// one `feature_type`.
    pub fn window_totals(
        &self,
        since: DateTime<Utc>,
        feature_type: Option<&str>,
    ) -> Result<UsageTotals> {
        self.store.with_tx(|tx| {
            let row = match feature_type {
                Some(feature_type) => tx.query_row(
                    "SELECT count(*), COALESCE(sum(input_tokens),0), \
                     COALESCE(sum(output_tokens),0), COALESCE(sum(total_tokens),0), \
                     COALESCE(sum(total_cost),0.0) \
                     FROM token_usage WHERE created_at >= ?1 AND feature_type = ?2",
                    params![since, feature_type],
                    row_to_totals,
                )?,
                None => tx.query_row(
                    "SELECT count(*), COALESCE(sum(input_tokens),0), \
                     COALESCE(sum(output_tokens),0), COALESCE(sum(total_tokens),0), \
                     COALESCE(sum(total_cost),0.0) \
                     FROM token_usage WHERE created_at >= ?1",
                    params![since],
                    row_to_totals,
                )?,
            };
            Ok(row)
        })
    }
}

fn row_to_totals(row: &rusqlite::Row<'_>) -> rusqlite::Result<UsageTotals> {
    Ok(UsageTotals {
        calls: row.get(0)?,
        input_tokens: row.get(1)?,
        output_tokens: row.get(2)?,
        total_tokens: row.get(3)?,
        total_cost: row.get(4)?,
    })
}

#[cfg(test)]
#[path = "token_usage_tests.rs"]
mod tests;
