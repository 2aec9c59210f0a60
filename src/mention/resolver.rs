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

//! Live `@` / `/` trigger detection and completion over composed text.
//!
//! Everything here is synchronous text manipulation keyed to a caret
//! position, measured in characters (not bytes). Dropdown state lives with
//! the caller; these functions only answer "is a trigger active", "which
//! candidates match", and "what does the text become on commit".

use crate::mention::session::{CommandSpec, EntityRef, SessionContext};

/// Maximum candidates kept per category after filtering.
pub const MAX_PER_CATEGORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// `@` — board and query mentions.
    Mention,
    /// `/` — slash commands.
    Command,
}

/// An active trigger found at the caret. `trigger_at` is the character
/// position of the trigger symbol itself; `query` is what the user has
/// typed after it so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerHit {
    pub kind: TriggerKind,
    pub trigger_at: usize,
    pub query: String,
}

/// Text and caret after a completion has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub text: String,
    pub caret: usize,
}

/// Detect an active trigger at the caret.
///
/// Scans backwards from the caret; the nearest `@` or `/` decides. The
/// trigger must start a word (position 0 or preceded by whitespace) so
/// that text like `bob@example.com` does not open a dropdown, and any
/// whitespace between trigger and caret ends the match.
#[must_use]
pub fn detect_trigger_at_caret(text: &str, caret: usize) -> Option<TriggerHit> {
    let chars: Vec<char> = text.chars().collect();
    if caret > chars.len() {
        return None;
    }

    let mut i = caret;
    while i > 0 {
        i -= 1;
        let ch = *chars.get(i)?;
        if ch == '@' || ch == '/' {
            // The trigger must be at the start of a word.
            if i == 0 || chars.get(i - 1).is_some_and(|c| c.is_whitespace()) {
                let kind =
                    if ch == '@' { TriggerKind::Mention } else { TriggerKind::Command };
                let query: String = chars[i + 1..caret].iter().collect();
                return Some(TriggerHit { kind, trigger_at: i, query });
            }
            return None;
        }
        // Whitespace before any trigger means no active trigger here.
        if ch.is_whitespace() {
            return None;
        }
    }
    None
}

/// Filter boards and queries by case-insensitive name prefix, boards
/// first, at most [`MAX_PER_CATEGORY`] of each. An empty query matches
/// everything.
#[must_use]
pub fn filter_mention_candidates(
    boards: &[EntityRef],
    queries: &[EntityRef],
    query: &str,
) -> Vec<EntityRef> {
    let query_lower = query.to_lowercase();
    let mut candidates: Vec<EntityRef> = boards
        .iter()
        .filter(|entity| entity.name.to_lowercase().starts_with(&query_lower))
        .take(MAX_PER_CATEGORY)
        .cloned()
        .collect();
    candidates.extend(
        queries
            .iter()
            .filter(|entity| entity.name.to_lowercase().starts_with(&query_lower))
            .take(MAX_PER_CATEGORY)
            .cloned(),
    );
    candidates
}

/// Filter the command list by case-insensitive name prefix, at most
/// [`MAX_PER_CATEGORY`] results.
#[must_use]
pub fn filter_command_candidates(commands: &[CommandSpec], query: &str) -> Vec<CommandSpec> {
    let query_lower = query.to_lowercase();
    commands
        .iter()
        .filter(|command| command.name.to_lowercase().starts_with(&query_lower))
        .take(MAX_PER_CATEGORY)
        .cloned()
        .collect()
}

/// Apply a mention completion: replace `[trigger_at, caret)` with
/// `@name ` and remember which entity the name refers to.
#[must_use]
pub fn commit_mention(
    text: &str,
    caret: usize,
    trigger_at: usize,
    entity: &EntityRef,
    session: &mut SessionContext,
) -> CommitResult {
    session.record_mention(entity);
    replace_span(text, trigger_at, caret, &format!("@{} ", entity.name))
}

/// Apply a command completion: replace `[trigger_at, caret)` with `/name `.
#[must_use]
pub fn commit_command(
    text: &str,
    caret: usize,
    trigger_at: usize,
    command: &CommandSpec,
) -> CommitResult {
    replace_span(text, trigger_at, caret, &format!("/{} ", command.name))
}

/// Rebuild `text` with `[trigger_at, caret)` (character positions)
/// replaced by `replacement`, placing the caret after the replacement.
fn replace_span(text: &str, trigger_at: usize, caret: usize, replacement: &str) -> CommitResult {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());
    let trigger_at = trigger_at.min(caret);

    let before: String = chars[..trigger_at].iter().collect();
    let after: String = chars[caret..].iter().collect();

    let new_caret = trigger_at + replacement.chars().count();
    CommitResult { text: format!("{before}{replacement}{after}"), caret: new_caret }
}

/// Find all `@name` tokens in a composed text. Returns
/// `(start_byte, end_byte, name)` tuples in order of occurrence. A token
/// must start a word and extends to the next whitespace or end of text.
#[must_use]
pub fn find_mention_tokens(text: &str) -> Vec<(usize, usize, String)> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '@' && (i == 0 || chars[i - 1].is_whitespace()) {
            let start = i;
            i += 1; // skip `@`
            let name_start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            if i > name_start {
                let name: String = chars[name_start..i].iter().collect();
                // Convert char indices to byte offsets
                let byte_start: usize = chars[..start].iter().map(|c| c.len_utf8()).sum();
                let byte_end: usize = chars[..i].iter().map(|c| c.len_utf8()).sum();
                tokens.push((byte_start, byte_end, name));
            }
        } else {
            i += 1;
        }
    }

    tokens
}
