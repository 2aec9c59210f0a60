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

mod injector;
mod resolver;
mod session;

pub use injector::{collect_mentions, expand_prompt};
pub use resolver::{
    CommitResult, MAX_PER_CATEGORY, TriggerHit, TriggerKind, commit_command, commit_mention,
    detect_trigger_at_caret, filter_command_candidates, filter_mention_candidates,
    find_mention_tokens,
};
pub use session::{CommandSpec, EntityKind, EntityRef, MentionTarget, SessionContext};
