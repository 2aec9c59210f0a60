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

//! Request and catalog types for the agent backend.

use crate::mention::{EntityKind, EntityRef};
use crate::turn::{Turn, TurnRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prior turns beyond this count are dropped from the outgoing request,
/// oldest first, before empty entries are filtered.
pub const HISTORY_LIMIT: usize = 50;

const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 200;

/// What the assistant is being asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Board,
    Query,
    Datastore,
    General,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Board => "board",
            Self::Query => "query",
            Self::Datastore => "datastore",
            Self::General => "general",
        };
        f.write_str(label)
    }
}

/// One prior turn reduced to what the backend replays into the model
/// context. Tool records, thinking, and code deltas do not survive this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: TurnRole,
    pub content: String,
}

impl ChatEntry {
    #[must_use]
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

impl From<&Turn> for ChatEntry {
    fn from(turn: &Turn) -> Self {
        Self { role: turn.role, content: turn.content.clone() }
    }
}

/// Cap the history at [`HISTORY_LIMIT`] most recent entries, then drop
/// entries with empty content. The cap applies first, so a run of empty
/// entries inside the window does not pull older turns back in.
#[must_use]
pub fn reduce_history(entries: &[ChatEntry]) -> Vec<ChatEntry> {
    let start = entries.len().saturating_sub(HISTORY_LIMIT);
    entries[start..].iter().filter(|entry| !entry.content.is_empty()).cloned().collect()
}

/// Body of the streaming request. Optional ids serialize only when set;
/// the backend treats absent and null differently for some of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRequest {
    pub user_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub chat: Vec<ChatEntry>,
    pub context: ContextKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastore_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tool_iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_file_paths: Option<Vec<String>>,
}

impl AgentRequest {
    #[must_use]
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            code: None,
            chat: Vec::new(),
            context: ContextKind::Board,
            board_id: None,
            datastore_id: None,
            query_id: None,
            chat_id: None,
            organization_id: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            uploaded_file_paths: None,
        }
    }

    #[must_use]
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn chat(mut self, chat: Vec<ChatEntry>) -> Self {
        self.chat = chat;
        self
    }

    #[must_use]
    pub fn context(mut self, context: ContextKind) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn board_id(mut self, id: impl Into<String>) -> Self {
        self.board_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn datastore_id(mut self, id: impl Into<String>) -> Self {
        self.datastore_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn query_id(mut self, id: impl Into<String>) -> Self {
        self.query_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn chat_id(mut self, id: impl Into<String>) -> Self {
        self.chat_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn uploaded_file_paths(mut self, paths: Vec<String>) -> Self {
        self.uploaded_file_paths = Some(paths);
        self
    }
}

/// Board row from the catalog endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
}

impl From<&BoardSummary> for EntityRef {
    fn from(board: &BoardSummary) -> Self {
        EntityRef::new(EntityKind::Board, board.id.clone(), board.name.clone())
    }
}

/// Saved-query row for one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<&QuerySummary> for EntityRef {
    fn from(query: &QuerySummary) -> Self {
        EntityRef::new(EntityKind::Query, query.id.clone(), query.name.clone())
    }
}

/// One model the backend can run a turn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub supports_tools: bool,
}
