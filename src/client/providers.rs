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

use crate::mention::EntityKind;
use crate::turn::{TurnId, TurnRole};
use async_trait::async_trait;

/// Fetches the full content behind a committed mention: board source for
/// board mentions, query source plus description for query mentions.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch(&self, kind: EntityKind, id: &str) -> anyhow::Result<String>;
}

/// Persists a finalized turn to the conversation store. Called once per
/// terminal turn, success or error, with the canonical content only.
#[async_trait]
pub trait TurnSink: Send + Sync {
    async fn append(&self, turn: &TurnId, role: TurnRole, content: &str) -> anyhow::Result<()>;
}
