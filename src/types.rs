//! Types for common values in Steam responses.

/// Uniquely identifies an application on Steam. For example: 753 for the Steam community app.
pub type AppId = u32;
/// A context ID belonging to an [`AppId`]. Trading cards live in context `6`.
pub type ContextId = u64;
/// An asset ID unique to an [`AppId`] + [`ContextId`] combination.
pub type AssetId = u64;
/// An amount for stackable items. For non-stackable items this is simply `1`.
pub type Amount = u32;
/// An ID for a class of item, shared by all copies of the same card.
pub type ClassId = u64;
/// A more specific instance of a class. `0` for most community items.
pub type InstanceId = u64;

// Types internally used by the crate.
use reqwest_middleware::ClientWithMiddleware;

pub(crate) type HttpClient = ClientWithMiddleware;
