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

pub mod client;
pub mod error;
pub mod mention;
pub mod stream;
pub mod turn;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "turnstream", about = "Streaming client for the board assistant")]
pub struct Cli {
    /// Prompt to send to the assistant. `@name` references boards and
    /// saved queries by display name.
    pub prompt: String,

    /// Base URL of the agent backend
    #[arg(long, default_value = "http://localhost:8000")]
    pub base_url: String,

    /// Override the model (ids as listed by the backend)
    #[arg(long, short)]
    pub model: Option<String>,

    /// What the prompt is about
    #[arg(long, value_enum, default_value_t = client::ContextKind::Board)]
    pub context: client::ContextKind,

    /// Board the prompt refers to
    #[arg(long)]
    pub board_id: Option<String>,

    /// Saved query the prompt refers to
    #[arg(long)]
    pub query_id: Option<String>,

    /// Datastore the prompt refers to
    #[arg(long)]
    pub datastore_id: Option<String>,

    /// Chat to load history from and append the finished turn to
    #[arg(long)]
    pub chat_id: Option<String>,

    /// Organization whose boards populate `@` mention candidates
    #[arg(long)]
    pub organization_id: Option<String>,

    /// Write diagnostics to this file (tracing is off without it)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,

    /// Tracing filter directives, e.g. `info` or `turnstream=debug`
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,
}
