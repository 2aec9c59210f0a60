// =====
// TESTS: 13
// =====
//
// Stream lifecycle integration tests.
// Drives raw SSE bytes through the decoder and the turn assembler and
// validates content transitions from first chunk to terminal frame.

use pretty_assertions::assert_eq;
use turnstream::stream::{Frame, StreamDecoder};
use turnstream::turn::{Turn, reduce};

use crate::helpers::{decode_chunks, final_frame, progress, reduce_all};

// --- Chunk reassembly ---

#[test]
fn split_data_line_across_chunks_yields_one_final_frame() {
    let mut decoder = StreamDecoder::new();

    let first = decoder.push(b"data: {\"typ");
    assert!(first.is_empty(), "incomplete line must stay buffered");

    let second = decoder.push(b"e\":\"final\",\"message\":\"Done\"}\n");
    assert_eq!(second, vec![Frame::Final { message: "Done".to_owned(), code: None }]);
}

#[test]
fn multiple_frames_in_a_single_chunk_keep_order() {
    let frames = decode_chunks(&[b"data: {\"type\":\"progress\",\"content\":\"one\"}\n\
         data: {\"type\":\"progress\",\"content\":\"two\"}\n\
         data: {\"type\":\"final\",\"message\":\"done\"}\n"]);

    assert_eq!(
        frames,
        vec![
            progress("one"),
            progress("two"),
            Frame::Final { message: "done".to_owned(), code: None },
        ]
    );
}

#[test]
fn chunk_boundaries_do_not_change_the_result() {
    let wire = b"data: {\"type\":\"thinking\",\"content\":\"planning\"}\n\
         data: {\"type\":\"progress\",\"content\":\"step\"}\n\
         data: {\"type\":\"final\",\"message\":\"done\"}\n";
    let whole = decode_chunks(&[wire]);

    for split_at in [1, 7, 20, wire.len() - 2] {
        let (head, tail) = wire.split_at(split_at);
        assert_eq!(decode_chunks(&[head, tail]), whole, "split at {split_at}");
    }
}

#[test]
fn unterminated_final_line_flushes_on_finish() {
    let mut decoder = StreamDecoder::new();

    let pushed = decoder.push(b"data: {\"type\":\"final\",\"message\":\"cut off\"}");
    assert!(pushed.is_empty());

    let flushed = decoder.finish();
    assert_eq!(flushed, vec![Frame::Final { message: "cut off".to_owned(), code: None }]);
}

#[test]
fn crlf_terminated_lines_decode() {
    let frames = decode_chunks(&[b"data: {\"type\":\"progress\",\"content\":\"step\"}\r\n"]);
    assert_eq!(frames, vec![progress("step")]);
}

// --- Malformed and foreign input ---

#[test]
fn malformed_line_is_dropped_and_stream_continues() {
    let frames = decode_chunks(&[b"data: {\"type\":\"progress\",\"content\":\"ok\"}\n\
         data: {\"type\":\"progress\",\"content\":\n\
         data: {\"type\":\"no_such_frame\"}\n\
         data: {\"type\":\"final\",\"message\":\"done\"}\n"]);

    assert_eq!(
        frames,
        vec![progress("ok"), Frame::Final { message: "done".to_owned(), code: None }]
    );

    let turn = reduce_all(&frames);
    assert_eq!(turn.content, "done");
    assert!(!turn.is_streaming);
}

#[test]
fn non_data_lines_are_ignored() {
    let frames = decode_chunks(&[b"\n: keep-alive\nevent: message\n\n"]);
    assert!(frames.is_empty());
}

// --- Turn lifecycle ---

#[test]
fn turn_streams_until_terminal_frame() {
    let open = Turn::open();
    assert!(open.is_streaming);
    assert!(!open.is_terminal());

    let frames = decode_chunks(&[b"data: {\"type\":\"thinking\",\"content\":\"planning\"}\n\
         data: {\"type\":\"progress\",\"content\":\"running\"}\n"]);
    let mid = frames.iter().fold(open, |turn, frame| reduce(&turn, frame));
    assert!(mid.is_streaming, "no terminal frame seen yet");

    let done = reduce(&mid, &final_frame("all set"));
    assert!(!done.is_streaming);
    assert!(done.is_terminal());
}

#[test]
fn progress_lines_append_and_final_replaces_content() {
    let mut turn = Turn::open();

    turn = reduce(&turn, &progress("Analyzing board"));
    assert_eq!(turn.content, "Analyzing board");

    turn = reduce(&turn, &progress("Generating SQL"));
    assert_eq!(turn.content, "Analyzing board\nGenerating SQL");

    turn = reduce(&turn, &final_frame("Here is your query"));
    assert_eq!(turn.content, "Here is your query");
    assert!(!turn.is_streaming);
}

#[test]
fn error_frame_ends_the_turn() {
    let frames =
        decode_chunks(&[b"data: {\"type\":\"error\",\"content\":\"model overloaded\"}\n"]);
    let turn = reduce_all(&frames);

    assert_eq!(turn.content, "model overloaded");
    assert!(!turn.is_streaming);
    assert!(turn.is_terminal());
}

#[test]
fn frames_after_terminal_are_ignored() {
    let mut turn = reduce_all(&[progress("working"), final_frame("done")]);
    let closed = turn.clone();

    turn = reduce(&turn, &progress("late"));
    turn = reduce(&turn, &final_frame("even later"));
    assert_eq!(turn, closed);
}

#[test]
fn needs_user_input_keeps_turn_open_until_final() {
    let frames = decode_chunks(&[
        b"data: {\"type\":\"needs_user_input\",\"message\":\"Which dataset?\",\"error\":\"ambiguous name\"}\n",
    ]);
    let asked = reduce_all(&frames);

    assert!(asked.is_streaming, "a question does not end the turn");
    let request = asked.needs_user_input.as_ref().expect("request recorded");
    assert_eq!(request.message, "Which dataset?");
    assert_eq!(request.error.as_deref(), Some("ambiguous name"));

    let done = reduce(&asked, &final_frame("Stopping here"));
    assert!(!done.is_streaming);
    assert_eq!(done.content, "Stopping here");
}

// --- Determinism ---

#[test]
fn replaying_a_recorded_stream_rebuilds_identical_turn() {
    let frames = decode_chunks(&[b"data: {\"type\":\"thinking\",\"content\":\"plan\"}\n\
         data: {\"type\":\"progress\",\"content\":\"step 1\"}\n\
         data: {\"type\":\"tool_call\",\"tool\":\"run_query\",\"status\":\"started\"}\n\
         data: {\"type\":\"tool_result\",\"tool\":\"run_query\",\"status\":\"success\",\"result\":{\"rows\":2}}\n\
         data: {\"type\":\"code_delta\",\"old_code\":\"\",\"new_code\":\"SELECT 1\"}\n\
         data: {\"type\":\"final\",\"message\":\"done\",\"code\":\"SELECT 1\"}\n"]);

    assert_eq!(reduce_all(&frames), reduce_all(&frames));
}
