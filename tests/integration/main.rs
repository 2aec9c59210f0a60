mod helpers;
mod mention_flow;
mod stream_lifecycle;
