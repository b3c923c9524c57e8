use crate::types::{Amount, AssetId, ContextId};
use crate::serialize::string;
use serde::{Deserialize, Serialize};

/// An item from an inventory, joined with its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// The item's asset ID.
    #[serde(with = "string")]
    pub assetid: AssetId,
    /// The amount of this item.
    #[serde(with = "string")]
    pub amount: Amount,
    /// The path of the item's icon on Steam's CDN.
    pub icon_url: String,
    /// The name of the item.
    pub name: String,
    /// The item's type, e.g. "Portal 2 Trading Card".
    #[serde(rename = "type")]
    pub item_type: String,
    /// Whether the item can be traded.
    pub tradable: bool,
    /// The context the item belongs to.
    #[serde(with = "string")]
    pub contextid: ContextId,
}
