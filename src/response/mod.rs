//! Models for data returned from Steam.

mod farmable_game;
mod inventory_item;
mod notifications;
mod privacy_settings;

pub use farmable_game::FarmableGame;
pub use inventory_item::InventoryItem;
pub use notifications::Notifications;
pub use privacy_settings::PrivacySettings;
