use async_trait::async_trait;
use turnstream::client::ContentProvider;
use turnstream::mention::EntityKind;
use turnstream::stream::{Frame, StreamDecoder, ToolStatus};
use turnstream::turn::{Turn, reduce};

/// Shorthand for a `progress` frame.
pub fn progress(content: &str) -> Frame {
    Frame::Progress { content: content.to_owned() }
}

/// Shorthand for a `thinking` frame.
pub fn thinking(content: &str) -> Frame {
    Frame::Thinking { content: content.to_owned() }
}

/// A tool announcement without arguments.
pub fn tool_call(tool: &str) -> Frame {
    Frame::ToolCall { tool: tool.to_owned(), status: ToolStatus::Started, args: None }
}

/// A successful tool result carrying a JSON payload.
pub fn tool_success(tool: &str, result: serde_json::Value) -> Frame {
    Frame::ToolResult {
        tool: tool.to_owned(),
        status: ToolStatus::Success,
        result: Some(result),
        error: None,
    }
}

/// A failed tool result carrying an error message.
pub fn tool_failure(tool: &str, error: &str) -> Frame {
    Frame::ToolResult {
        tool: tool.to_owned(),
        status: ToolStatus::Error,
        result: None,
        error: Some(error.to_owned()),
    }
}

/// A terminal `final` frame without code.
pub fn final_frame(message: &str) -> Frame {
    Frame::Final { message: message.to_owned(), code: None }
}

/// A terminal `error` frame.
pub fn error_frame(content: &str) -> Frame {
    Frame::Error { content: content.to_owned() }
}

/// Fold a frame sequence into a turn, starting from a fresh open turn.
pub fn reduce_all(frames: &[Frame]) -> Turn {
    frames.iter().fold(Turn::open(), |turn, frame| reduce(&turn, frame))
}

/// Run raw byte chunks through a decoder, flushing the trailing buffer.
pub fn decode_chunks(chunks: &[&[u8]]) -> Vec<Frame> {
    let mut decoder = StreamDecoder::new();
    let mut frames = Vec::new();
    for chunk in chunks {
        frames.extend(decoder.push(chunk));
    }
    frames.extend(decoder.finish());
    frames
}

/// Content provider with deterministic output and no I/O.
pub struct StubProvider;

#[async_trait]
impl ContentProvider for StubProvider {
    async fn fetch(&self, kind: EntityKind, id: &str) -> anyhow::Result<String> {
        Ok(format!("{} source for {id}", kind.label()))
    }
}
