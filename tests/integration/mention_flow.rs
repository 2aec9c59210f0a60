// =====
// TESTS: 11
// =====
//
// Mention and command flow integration tests.
// Walks the full path a reference takes: trigger detection, candidate
// filtering, completion, and prompt expansion at submit time.

use pretty_assertions::assert_eq;
use turnstream::mention::{
    EntityKind, EntityRef, MAX_PER_CATEGORY, SessionContext, TriggerKind, collect_mentions,
    commit_command, commit_mention, detect_trigger_at_caret, expand_prompt,
    filter_command_candidates, filter_mention_candidates, find_mention_tokens,
};

use crate::helpers::StubProvider;

// --- Mention round trip ---

#[test]
fn commit_round_trip_recovers_the_entity() {
    let mut session = SessionContext::new();
    session.set_boards(vec![EntityRef::new(EntityKind::Board, "42", "board1")]);

    let text = "look at @bo";
    let caret = text.chars().count();
    let hit = detect_trigger_at_caret(text, caret).expect("active trigger");
    assert_eq!(hit.kind, TriggerKind::Mention);
    assert_eq!(hit.query, "bo");

    let candidates = filter_mention_candidates(session.boards(), session.queries(), &hit.query);
    assert_eq!(candidates.len(), 1);

    let committed = commit_mention(text, caret, hit.trigger_at, &candidates[0], &mut session);
    assert_eq!(committed.text, "look at @board1 ");

    let tokens = find_mention_tokens(&committed.text);
    assert_eq!(tokens.len(), 1);
    let target = session.resolve_name(&tokens[0].2).expect("name recorded at commit");
    assert_eq!(target.kind, EntityKind::Board);
    assert_eq!(target.id, "42");

    let mentions = collect_mentions(&committed.text, &session);
    assert_eq!(mentions, vec![EntityRef::new(EntityKind::Board, "42", "board1")]);
}

#[test]
fn commit_closes_the_trigger() {
    let mut session = SessionContext::new();
    let entity = EntityRef::new(EntityKind::Board, "1", "board1");

    let committed = commit_mention("@boa", 4, 0, &entity, &mut session);
    assert_eq!(committed.text, "@board1 ");
    assert_eq!(
        detect_trigger_at_caret(&committed.text, committed.caret),
        None,
        "trailing space ends the trigger"
    );
}

// --- Candidate filtering ---

#[test]
fn prefix_filter_keeps_matching_boards() {
    let boards = vec![
        EntityRef::new(EntityKind::Board, "1", "board1"),
        EntityRef::new(EntityKind::Board, "2", "boardX"),
        EntityRef::new(EntityKind::Board, "3", "other"),
    ];

    let hits = filter_mention_candidates(&boards, &[], "bo");
    let names: Vec<&str> = hits.iter().map(|entity| entity.name.as_str()).collect();
    assert_eq!(names, vec!["board1", "boardX"]);

    let upper = filter_mention_candidates(&boards, &[], "BO");
    assert_eq!(upper, hits, "prefix match ignores case");
}

#[test]
fn candidates_cap_at_five_per_category() {
    let boards: Vec<EntityRef> = (0..7)
        .map(|i| EntityRef::new(EntityKind::Board, i.to_string(), format!("board{i}")))
        .collect();
    let queries: Vec<EntityRef> = (0..7)
        .map(|i| EntityRef::new(EntityKind::Query, i.to_string(), format!("query{i}")))
        .collect();

    let hits = filter_mention_candidates(&boards, &queries, "");
    assert_eq!(hits.len(), 2 * MAX_PER_CATEGORY);
    assert!(hits[..MAX_PER_CATEGORY].iter().all(|e| e.kind == EntityKind::Board));
    assert!(hits[MAX_PER_CATEGORY..].iter().all(|e| e.kind == EntityKind::Query));
}

#[test]
fn nearest_trigger_decides_between_mention_and_command() {
    let hit = detect_trigger_at_caret("/retry @bo", 10).expect("active trigger");
    assert_eq!(hit.kind, TriggerKind::Mention);
    assert_eq!(hit.trigger_at, 7);
    assert_eq!(hit.query, "bo");

    assert_eq!(detect_trigger_at_caret("see bob@example.com", 19), None);
}

// --- Slash commands ---

#[test]
fn slash_command_commit_inserts_canonical_token() {
    let session = SessionContext::new();

    let hit = detect_trigger_at_caret("/ret", 4).expect("active trigger");
    assert_eq!(hit.kind, TriggerKind::Command);

    let matches = filter_command_candidates(session.commands(), &hit.query);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name, "retry");

    let committed = commit_command("/ret", 4, hit.trigger_at, &matches[0]);
    assert_eq!(committed.text, "/retry ");
    assert_eq!(committed.caret, 7);
}

// --- Name table ---

#[test]
fn latest_commit_wins_on_name_collision() {
    let mut session = SessionContext::new();
    session.record_mention(&EntityRef::new(EntityKind::Board, "1", "sales"));
    session.record_mention(&EntityRef::new(EntityKind::Query, "9", "sales"));

    let target = session.resolve_name("sales").expect("recorded");
    assert_eq!(target.kind, EntityKind::Query);
    assert_eq!(target.id, "9");
}

// --- Prompt expansion ---

#[tokio::test]
async fn expand_prompt_appends_referenced_content() {
    let mut session = SessionContext::new();
    session.record_mention(&EntityRef::new(EntityKind::Board, "42", "board1"));

    let prompt = expand_prompt("show @board1 please", &session, &StubProvider)
        .await
        .expect("expansion succeeds");
    assert_eq!(
        prompt,
        "show @board1 please\n\nReferenced content (board \"board1\"):\nboard source for 42"
    );
}

#[tokio::test]
async fn expand_prompt_deduplicates_repeated_mentions() {
    let mut session = SessionContext::new();
    session.record_mention(&EntityRef::new(EntityKind::Board, "42", "board1"));

    let prompt = expand_prompt("compare @board1 with @board1", &session, &StubProvider)
        .await
        .expect("expansion succeeds");
    assert_eq!(prompt.matches("Referenced content").count(), 1);
}

#[tokio::test]
async fn unresolved_mention_stays_literal() {
    let session = SessionContext::new();

    let prompt = expand_prompt("ping @ghost", &session, &StubProvider)
        .await
        .expect("expansion succeeds");
    assert_eq!(prompt, "ping @ghost");
}

#[tokio::test]
async fn mentions_expand_in_first_appearance_order() {
    let mut session = SessionContext::new();
    session.record_mention(&EntityRef::new(EntityKind::Query, "7", "monthly"));
    session.record_mention(&EntityRef::new(EntityKind::Board, "42", "board1"));

    let prompt = expand_prompt("run @monthly against @board1", &session, &StubProvider)
        .await
        .expect("expansion succeeds");
    assert_eq!(
        prompt,
        "run @monthly against @board1\
         \n\nReferenced content (query \"monthly\"):\nquery source for 7\
         \n\nReferenced content (board \"board1\"):\nboard source for 42"
    );
}
