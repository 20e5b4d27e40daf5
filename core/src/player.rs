//! Players and their bearer tokens.

use crate::store::PlayerId;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tillage_flow::Plot;

/// A player with the effective state of every plot it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub plots: Vec<Plot>,
}

/// Outcome of registering a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub id: PlayerId,
    pub name: String,
    /// Set only when the engine generated the token itself.
    pub generated_auth: Option<String>,
}

/// 32 random bytes, base64 encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    STANDARD.encode(bytes)
}
