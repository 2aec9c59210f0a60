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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of entity an `@` mention can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Board,
    Query,
}

impl EntityKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in the mention dropdown: a board or query the user may
/// reference by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind, id: id.into(), name: name.into() }
    }
}

/// One entry in the slash-command dropdown. The host dispatches on `id`;
/// `name` is what the completion inserts into the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: String,
    /// Command name without the leading `/`.
    pub name: String,
    pub description: String,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self { id: id.into(), name: name.into(), description: description.into() }
    }
}

/// Where a committed `@name` points. The composed text keeps only the
/// display name, so this is the only way back to the entity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionTarget {
    pub kind: EntityKind,
    pub id: String,
}

/// Working set for one composition session: the candidate pools the
/// dropdowns draw from, plus the name-to-entity table that committed
/// mentions write into and submit-time expansion reads back.
///
/// Always passed explicitly. Two entities sharing a display name collide
/// in the table; the most recent commit wins.
#[derive(Debug, Clone)]
pub struct SessionContext {
    boards: Vec<EntityRef>,
    queries: Vec<EntityRef>,
    commands: Vec<CommandSpec>,
    mentions: HashMap<String, MentionTarget>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            boards: Vec::new(),
            queries: Vec::new(),
            commands: vec![
                CommandSpec::new("cancel", "cancel", "Stop the in-flight turn"),
                CommandSpec::new("clear", "clear", "Clear the conversation history"),
                CommandSpec::new("model", "model", "Switch the active model"),
                CommandSpec::new("retry", "retry", "Resubmit the last prompt"),
            ],
            mentions: HashMap::new(),
        }
    }

    pub fn set_boards(&mut self, boards: Vec<EntityRef>) {
        self.boards = boards;
    }

    pub fn set_queries(&mut self, queries: Vec<EntityRef>) {
        self.queries = queries;
    }

    #[must_use]
    pub fn boards(&self) -> &[EntityRef] {
        &self.boards
    }

    #[must_use]
    pub fn queries(&self) -> &[EntityRef] {
        &self.queries
    }

    #[must_use]
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Remember which entity a committed `@name` refers to.
    pub fn record_mention(&mut self, entity: &EntityRef) {
        let target = MentionTarget { kind: entity.kind, id: entity.id.clone() };
        let previous = self.mentions.insert(entity.name.clone(), target.clone());
        if previous.is_some_and(|p| p != target) {
            tracing::debug!(name = %entity.name, "mention name rebound to a different entity");
        }
    }

    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<&MentionTarget> {
        self.mentions.get(name)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
