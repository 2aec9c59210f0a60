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

use crate::client::api::{AgentRequest, BoardSummary, ChatEntry, ModelInfo, QuerySummary};
use crate::client::providers::{ContentProvider, TurnSink};
use crate::error::EngineError;
use crate::mention::EntityKind;
use crate::stream::StreamDecoder;
use crate::turn::{Turn, TurnId, TurnRole, fail, reduce};
use anyhow::Context as _;
use async_trait::async_trait;
use futures::StreamExt as _;
use serde::Deserialize;

/// HTTP client for the board-assistant backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http: reqwest::Client::new(), base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a turn and consume its frame stream until it ends.
    ///
    /// `on_turn` is called with the freshly opened turn and again after
    /// every applied frame. A connection failure or non-success response
    /// fails before any turn exists and comes back as
    /// [`EngineError::Connect`]. Once the stream is open, a read failure
    /// ends the turn in its error state instead of failing the call. A
    /// stream that closes without a terminal frame returns the turn still
    /// marked streaming; whether to keep that partial state is the
    /// caller's decision.
    pub async fn stream_turn(
        &self,
        request: &AgentRequest,
        mut on_turn: impl FnMut(&Turn),
    ) -> Result<Turn, EngineError> {
        let url = format!("{}/board-helper-stream", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| EngineError::Connect(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Connect(format!(
                "server returned {status}: {}",
                body.trim()
            )));
        }

        let mut decoder = StreamDecoder::new();
        let mut turn = Turn::open();
        on_turn(&turn);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    let failure = EngineError::StreamRead(err.to_string());
                    tracing::warn!(error = %failure, "converting stream failure to an error turn");
                    turn = fail(&turn, &failure.to_string());
                    on_turn(&turn);
                    return Ok(turn);
                }
            };
            for frame in decoder.push(&chunk) {
                turn = reduce(&turn, &frame);
                on_turn(&turn);
                if turn.is_terminal() {
                    return Ok(turn);
                }
            }
        }

        for frame in decoder.finish() {
            turn = reduce(&turn, &frame);
            on_turn(&turn);
            if turn.is_terminal() {
                return Ok(turn);
            }
        }

        Ok(turn)
    }

    pub async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        self.get_json(&format!("{}/models", self.base_url)).await
    }

    pub async fn list_boards(&self, organization_id: &str) -> anyhow::Result<Vec<BoardSummary>> {
        let url = format!("{}/boards", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("organization_id", organization_id)])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("GET {url}"))?;
        response.json().await.context("decoding board list")
    }

    pub async fn list_queries(&self, board_id: &str) -> anyhow::Result<Vec<QuerySummary>> {
        self.get_json(&format!("{}/boards/{board_id}/queries", self.base_url)).await
    }

    /// Stored messages for a chat, oldest first. Roles other than
    /// `assistant` come back as `user`, which is also how the backend
    /// replays them into the model context.
    pub async fn list_messages(&self, chat_id: &str) -> anyhow::Result<Vec<ChatEntry>> {
        let rows: Vec<StoredMessage> =
            self.get_json(&format!("{}/chats/{chat_id}/messages", self.base_url)).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let role = if row.role == "assistant" {
                    TurnRole::Assistant
                } else {
                    TurnRole::User
                };
                ChatEntry::new(role, row.content)
            })
            .collect())
    }

    async fn get_json<T>(&self, url: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("GET {url}"))?;
        response.json().await.with_context(|| format!("decoding response from {url}"))
    }
}

#[derive(Debug, Deserialize)]
struct StoredMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct BoardCode {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryDetail {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    python_code: Option<String>,
}

#[async_trait]
impl ContentProvider for ApiClient {
    async fn fetch(&self, kind: EntityKind, id: &str) -> anyhow::Result<String> {
        match kind {
            EntityKind::Board => {
                let body: BoardCode =
                    self.get_json(&format!("{}/boards/{id}/code", self.base_url)).await?;
                Ok(body.code.unwrap_or_default())
            }
            EntityKind::Query => {
                let body: QueryDetail =
                    self.get_json(&format!("{}/queries/{id}", self.base_url)).await?;

                let mut sections = Vec::new();
                if let Some(description) = body.description.filter(|d| !d.is_empty()) {
                    sections.push(format!("Description: {description}"));
                }
                if let Some(code) = body.python_code {
                    sections.push(code);
                }
                Ok(sections.join("\n\n"))
            }
        }
    }
}

#[async_trait]
impl TurnSink for ApiClient {
    async fn append(&self, turn: &TurnId, role: TurnRole, content: &str) -> anyhow::Result<()> {
        let url = format!("{}/chats/{turn}/messages", self.base_url);
        self.http
            .post(&url)
            .json(&ChatEntry::new(role, content))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("POST {url}"))?;
        Ok(())
    }
}
