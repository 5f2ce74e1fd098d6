//! Parse ANSI-coloured agent conversation transcripts (`Human Message` /
//! `Ai Message` / `Tool Message` blocks) into message records, and render
//! them for display.

pub mod ansi;
pub mod preferences;
pub mod render;
pub mod source;
pub mod transcript;
pub mod view;
