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
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(String);

impl TurnId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<String> for TurnId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for TurnId {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One registered tool invocation and its lifecycle so far. The ordinal is
/// handed out at registration time and is unique across the whole ledger,
/// not per tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub status: ToolStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub ordinal: u64,
}

impl ToolCallRecord {
    #[must_use]
    pub fn started(tool: impl Into<String>, ordinal: u64) -> Self {
        Self {
            tool: tool.into(),
            status: ToolStatus::Started,
            args: None,
            result: None,
            error: None,
            ordinal,
        }
    }

    #[must_use]
    pub fn args(mut self, args: serde_json::Value) -> Self {
        self.args = Some(args);
        self
    }

    #[must_use]
    pub fn result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: ToolStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDelta {
    pub old_code: String,
    pub new_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The evolving state of one assistant response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    /// Rolling progress log while streaming; overwritten wholesale by the
    /// terminal frame's canonical text.
    pub content: String,
    /// Latest reasoning note, replaced on every `thinking` frame.
    pub thinking: Option<String>,
    /// Most recent code patch only, never a cumulative diff.
    pub code_delta: Option<CodeDelta>,
    /// Set when the agent is blocked on a human reply. Does not end the turn.
    pub needs_user_input: Option<UserInputRequest>,
    /// Ordered by first announcement, never reordered.
    pub tool_calls: Vec<ToolCallRecord>,
    /// True from creation until exactly one terminal frame, then false for
    /// good.
    pub is_streaming: bool,
}

impl Turn {
    /// Fresh empty turn for a newly opened stream.
    #[must_use]
    pub fn open() -> Self {
        Self {
            role: TurnRole::Assistant,
            content: String::new(),
            thinking: None,
            code_delta: None,
            needs_user_input: None,
            tool_calls: Vec::new(),
            is_streaming: true,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_streaming
    }

    /// Any registered tool call still awaiting its result.
    #[must_use]
    pub fn has_pending_tools(&self) -> bool {
        self.tool_calls.iter().any(|record| record.status == ToolStatus::Started)
    }
}
