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

use crate::error::EngineError;
use crate::stream::frame::Frame;

/// Longest payload slice quoted in a malformed-frame log line.
const LOG_PAYLOAD_CAP: usize = 240;

/// Incremental decoder for the `data: `-prefixed event stream.
///
/// Chunks arrive at arbitrary boundaries, so a trailing partial line is kept
/// in a carry-over buffer until its newline shows up. Complete lines that do
/// not carry the `data: ` prefix (blank event separators, keep-alives) are
/// ignored. A line whose payload fails to parse is dropped on its own; the
/// stream keeps going.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk and collect every frame completed by it, in
    /// arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            if let Some(frame) = decode_line(line.trim()) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush the carry-over buffer when the transport closes. A server that
    /// omits the trailing newline on its last event still gets that frame
    /// delivered; anything unparseable is dropped like any other bad line.
    pub fn finish(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        for line in self.buffer.lines() {
            if let Some(frame) = decode_line(line.trim()) {
                frames.push(frame);
            }
        }
        self.buffer.clear();
        frames
    }
}

fn decode_line(line: &str) -> Option<Frame> {
    let payload = line.strip_prefix("data: ")?.trim();
    match serde_json::from_str::<Frame>(payload) {
        Ok(frame) => Some(frame),
        Err(parse_err) => {
            let err = EngineError::MalformedFrame(parse_err.to_string());
            let quoted = truncate_for_log(payload);
            tracing::warn!(error = %err, payload = quoted, "dropping frame line");
            None
        }
    }
}

fn truncate_for_log(payload: &str) -> &str {
    let mut end = payload.len().min(LOG_PAYLOAD_CAP);
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    &payload[..end]
}
