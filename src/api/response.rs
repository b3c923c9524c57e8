//! Raw responses from Steam.

use std::collections::HashMap;
use serde::Deserialize;
use crate::{
    types::{Amount, AssetId, ClassId, InstanceId},
    serialize::{into_bool, map_or_empty_seq, string},
};

#[derive(Deserialize, Debug)]
pub struct AuthenticateUserResponse {
    pub authenticateuser: AuthenticateUser,
}

#[derive(Deserialize, Debug)]
pub struct AuthenticateUser {
    pub tokensecure: String,
}

#[derive(Deserialize, Debug)]
pub struct FinalizeLoginResponse {
    #[serde(default, rename = "steamID")]
    pub steamid: Option<String>,
    #[serde(default)]
    pub transfer_info: Vec<TransferInfo>,
    #[serde(default)]
    pub error: Option<i32>,
}

/// One of several equivalent endpoints which set login cookies for a domain.
#[derive(Deserialize, Debug, Clone)]
pub struct TransferInfo {
    pub url: String,
    pub params: TransferParams,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TransferParams {
    pub nonce: String,
    pub auth: String,
}

#[derive(Deserialize, Debug)]
pub struct TransferResponse {
    #[serde(default)]
    pub result: i32,
}

#[derive(Deserialize, Debug)]
pub struct GetInventoryResponse {
    #[serde(default)]
    #[serde(deserialize_with = "into_bool")]
    pub success: bool,
    #[serde(default, rename = "Error")]
    pub error: Option<String>,
    #[serde(default)]
    #[serde(deserialize_with = "map_or_empty_seq", rename = "rgInventory")]
    pub assets: HashMap<String, RawAsset>,
    #[serde(default)]
    #[serde(deserialize_with = "map_or_empty_seq", rename = "rgDescriptions")]
    pub descriptions: HashMap<String, RawDescription>,
}

#[derive(Deserialize, Debug)]
pub struct RawAsset {
    #[serde(with = "string")]
    pub id: AssetId,
    #[serde(with = "string")]
    pub classid: ClassId,
    #[serde(with = "string")]
    pub instanceid: InstanceId,
    #[serde(with = "string")]
    pub amount: Amount,
}

impl RawAsset {
    /// The key of this asset's description in `rgDescriptions`.
    pub fn description_key(&self) -> String {
        format!("{}_{}", self.classid, self.instanceid)
    }
}

#[derive(Deserialize, Debug)]
pub struct RawDescription {
    #[serde(default)]
    pub icon_url: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub item_type: String,
    #[serde(deserialize_with = "into_bool")]
    pub tradable: bool,
}

#[derive(Deserialize, Debug)]
pub struct AvatarUploadResponse {
    #[serde(deserialize_with = "into_bool")]
    pub success: bool,
    #[serde(default)]
    pub images: Option<AvatarImages>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AvatarImages {
    pub full: String,
}
