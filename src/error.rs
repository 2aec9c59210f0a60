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

/// Failure classes of the streaming engine.
///
/// `Connect` aborts a submission before any turn exists. `StreamRead` is
/// fatal only to the turn being assembled: the driver converts it into the
/// turn's error-terminal state instead of propagating a panic or killing the
/// session. `MalformedFrame` never escapes the decoder loop; it is logged
/// and the offending line is dropped. Two failure shapes deliberately have
/// no variant here: a tool error travels inside the tool record itself, and
/// an unresolvable `@name` stays literal text in the prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("agent request failed: {0}")]
    Connect(String),
    #[error("stream read failed: {0}")]
    StreamRead(String),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl EngineError {
    pub const CONNECT_EXIT_CODE: i32 = 20;
    pub const STREAM_READ_EXIT_CODE: i32 = 21;
    pub const MALFORMED_FRAME_EXIT_CODE: i32 = 22;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connect(_) => Self::CONNECT_EXIT_CODE,
            Self::StreamRead(_) => Self::STREAM_READ_EXIT_CODE,
            Self::MalformedFrame(_) => Self::MALFORMED_FRAME_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Connect(_) => {
                "Could not reach the assistant endpoint. Check --base-url and that the server is running."
            }
            Self::StreamRead(_) => {
                "The response stream was interrupted. The partial turn was kept; resubmit to retry."
            }
            Self::MalformedFrame(_) => "The server sent an unreadable frame.",
        }
    }
}
