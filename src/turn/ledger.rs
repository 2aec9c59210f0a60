// turnstream - Streaming turn engine for an AI board assistant
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::stream::ToolStatus;
use crate::turn::model::ToolCallRecord;

/// Ordered registry of tool invocations for one turn.
///
/// The wire protocol carries no call id, only the tool name, so a result is
/// correlated to the most recently registered still-pending call of that
/// tool (LIFO within tool). That tie-break matches how the backend resolves
/// its own calls; it is not sound for a backend that interleaves these
/// differently. Records are append-only and keep their registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallLedger {
    records: Vec<ToolCallRecord>,
    next_ordinal: u64,
}

impl ToolCallLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from previously snapshotted records. Ordinal
    /// handout resumes above the highest one present.
    #[must_use]
    pub fn from_records(records: Vec<ToolCallRecord>) -> Self {
        let next_ordinal =
            records.iter().map(|record| record.ordinal + 1).max().unwrap_or_default();
        Self { records, next_ordinal }
    }

    /// Register a freshly announced invocation. Returns its ordinal.
    pub fn register(&mut self, tool: &str, args: Option<serde_json::Value>) -> u64 {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        let mut record = ToolCallRecord::started(tool, ordinal);
        record.args = args;
        self.records.push(record);
        ordinal
    }

    /// Correlate a result to the newest pending registration of `tool` and
    /// settle it. When nothing is pending for that tool (out-of-order or
    /// orphaned result), a new already-settled record is appended instead.
    /// Returns the ordinal of the record written.
    pub fn resolve(
        &mut self,
        tool: &str,
        status: ToolStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> u64 {
        let pending = self
            .records
            .iter_mut()
            .rev()
            .find(|record| record.tool == tool && record.status == ToolStatus::Started);

        if let Some(record) = pending {
            record.status = status;
            record.result = result;
            record.error = error;
            return record.ordinal;
        }

        tracing::debug!(tool, "tool result without pending call; appending settled record");
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        let mut record = ToolCallRecord::started(tool, ordinal);
        record.status = status;
        record.result = result;
        record.error = error;
        self.records.push(record);
        ordinal
    }

    #[must_use]
    pub fn records(&self) -> &[ToolCallRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<ToolCallRecord> {
        self.records
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.records.iter().any(|record| record.status == ToolStatus::Started)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
