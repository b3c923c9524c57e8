use crate::types::AppId;
use serde::{Deserialize, Serialize};

/// A game that still has trading cards to drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmableGame {
    /// The name of the game.
    pub name: String,
    /// The app ID of the game.
    pub appid: AppId,
    /// Hours played on record.
    pub playtime: f64,
    /// Card drops still to be received.
    pub remaining_cards: u32,
    /// Card drops already received.
    pub dropped_cards: u32,
}
