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

//! Submit-time expansion of committed mentions.
//!
//! The composed prompt carries mentions as plain `@name` tokens. Right
//! before the request goes out, the tokens are re-scanned, looked up in the
//! session table, and the referenced content is fetched and appended to the
//! prompt. A name with no table entry stays literal text; it is what the
//! user typed, not a failure.

use crate::client::ContentProvider;
use crate::mention::resolver::find_mention_tokens;
use crate::mention::session::{EntityRef, SessionContext};
use anyhow::Context as _;
use std::collections::HashSet;

/// Resolve the `@name` tokens in `text` against the session table.
/// Results keep first-occurrence order; repeats of the same entity are
/// dropped, as are names the table does not know.
#[must_use]
pub fn collect_mentions(text: &str, session: &SessionContext) -> Vec<EntityRef> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for (_, _, name) in find_mention_tokens(text) {
        let Some(target) = session.resolve_name(&name) else {
            tracing::debug!(%name, "mention has no recorded entity; leaving it literal");
            continue;
        };
        if seen.insert((target.kind, target.id.clone())) {
            mentions.push(EntityRef::new(target.kind, target.id.clone(), name));
        }
    }
    mentions
}

/// Expand `text` into the outgoing prompt: the original text followed by
/// one referenced-content block per resolved mention, in mention order.
pub async fn expand_prompt(
    text: &str,
    session: &SessionContext,
    provider: &dyn ContentProvider,
) -> anyhow::Result<String> {
    let mentions = collect_mentions(text, session);

    let mut prompt = text.to_owned();
    for mention in &mentions {
        let content = provider
            .fetch(mention.kind, &mention.id)
            .await
            .with_context(|| format!("failed to fetch {} \"{}\"", mention.kind, mention.name))?;
        prompt.push_str(&format!(
            "\n\nReferenced content ({} \"{}\"):\n{}",
            mention.kind, mention.name, content
        ));
    }
    Ok(prompt)
}
