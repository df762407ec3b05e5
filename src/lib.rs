//! Audiorelay - audio from video URLs over HTTP, powered by yt-dlp
//!
//! This library crate exposes the server and configuration for integration testing.

pub mod config;
pub mod server;
