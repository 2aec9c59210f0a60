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

//! Frame-by-frame turn assembly.
//!
//! [`reduce`] folds one decoded frame into a turn and returns the new turn
//! value. The input is never mutated, so every intermediate turn is a stable
//! snapshot the caller can hand to a renderer or store without copying
//! hazards. Feeding the same frames in the same order always produces the
//! same turn.

use crate::stream::Frame;
use crate::turn::ledger::ToolCallLedger;
use crate::turn::model::{CodeDelta, Turn, UserInputRequest};

/// Fold `frame` into `prior` and return the updated turn.
///
/// Once a turn has ended (`final` or `error` frame seen), later frames are
/// ignored and the prior turn comes back unchanged.
#[must_use]
pub fn reduce(prior: &Turn, frame: &Frame) -> Turn {
    if prior.is_terminal() {
        return prior.clone();
    }

    let mut turn = prior.clone();
    match frame {
        Frame::Thinking { content } => {
            turn.thinking = Some(content.clone());
        }
        Frame::Progress { content } => {
            if !turn.content.is_empty() {
                turn.content.push('\n');
            }
            turn.content.push_str(content);
        }
        Frame::ToolCall { tool, args, .. } => {
            let mut ledger = ToolCallLedger::from_records(std::mem::take(&mut turn.tool_calls));
            ledger.register(tool, args.clone());
            turn.tool_calls = ledger.into_records();
        }
        Frame::ToolResult { tool, status, result, error } => {
            let mut ledger = ToolCallLedger::from_records(std::mem::take(&mut turn.tool_calls));
            ledger.resolve(tool, *status, result.clone(), error.clone());
            turn.tool_calls = ledger.into_records();
        }
        Frame::CodeDelta { old_code, new_code } => {
            turn.code_delta =
                Some(CodeDelta { old_code: old_code.clone(), new_code: new_code.clone() });
        }
        Frame::NeedsUserInput { message, error, .. } => {
            turn.needs_user_input =
                Some(UserInputRequest { message: message.clone(), error: error.clone() });
        }
        Frame::Final { message, .. } => {
            turn.content = message.clone();
            turn.is_streaming = false;
        }
        Frame::Error { content } => {
            turn.content = content.clone();
            turn.is_streaming = false;
        }
    }
    turn
}

/// End a turn with a locally generated error, for failures that happen on
/// this side of the wire (a dropped connection mid-stream, for example).
/// Routed through the same `error` handling as a server error frame.
#[must_use]
pub fn fail(prior: &Turn, message: &str) -> Turn {
    reduce(prior, &Frame::Error { content: message.to_owned() })
}
