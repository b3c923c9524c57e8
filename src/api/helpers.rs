use super::response::{AvatarUploadResponse, GetInventoryResponse, TransferInfo};
use crate::error::{Error, ParseHtmlError, Result};
use crate::helpers::parses_body;
use crate::response::{FarmableGame, InventoryItem};
use crate::types::{AppId, ContextId};
use lazy_regex::{regex_find, regex_is_match};
use scraper::{ElementRef, Html, Selector};

/// The sentinel Steam's file uploader sends when it does not accept the session cookies.
const BAD_COOKIE_SENTINEL: &str = "#Error_BadOrMissingSteamCookie";

fn selector(selectors: &str) -> Result<Selector, ParseHtmlError> {
    Selector::parse(selectors)
        .map_err(|_| ParseHtmlError::ParseSelector)
}

/// Collects the text of an element, leaving out anything inside a `.badge_view_details` element.
fn text_without_details(element: ElementRef) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let in_details = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|ancestor| ancestor.classes().any(|class| class == "badge_view_details"));

        if !in_details {
            text.push_str(chunk);
        }
    }

    text
}

/// Whether the primary action link in the page header asks the user to log in.
fn shows_login_prompt(document: &Html) -> Result<bool, ParseHtmlError> {
    let link_selector = selector("a.global_action_link")?;

    Ok(document
        .select(&link_selector)
        .next()
        .map(|link| link.text().collect::<String>().to_lowercase().contains("login"))
        .unwrap_or(false))
}

/// Parses the games which still have card drops from a badges page.
pub fn parse_farmable_games(body: &str) -> Result<Vec<FarmableGame>> {
    let document = Html::parse_document(body);

    if shows_login_prompt(&document)? {
        return Err(Error::CookieExpired);
    }

    let row_selector = selector(".badge_row")?;
    let progress_selector = selector(".progress_info_bold")?;
    let playtime_selector = selector(".badge_title_stats_playtime")?;
    let title_selector = selector(".badge_title")?;
    let overlay_selector = selector(".badge_row_overlay")?;
    let drop_info_selector = selector(".card_drop_info_header")?;
    let mut games = Vec::new();

    for row in document.select(&row_selector) {
        let Some(progress) = row.select(&progress_selector).next() else {
            continue;
        };
        let progress = progress.text().collect::<String>();

        // Rows for non-game badges show "tasks remaining".
        if !regex_is_match!(r"card drops? remaining", &progress) {
            continue;
        }

        let Some(remaining_cards) = regex_find!(r#"\d+"#, &progress)
            .and_then(|count| count.parse::<u32>().ok()) else {
            continue;
        };

        if remaining_cards == 0 {
            continue;
        }

        let playtime = row
            .select(&playtime_selector)
            .next()
            .map(|element| element.text().collect::<String>())
            .filter(|text| text.contains("on record"))
            .and_then(|text| {
                let text = text.replace(',', "");

                regex_find!(r#"\d+(\.\d+)?"#, &text)
                    .and_then(|hours| hours.parse::<f64>().ok())
            })
            .unwrap_or(0.0);
        let name = row
            .select(&title_selector)
            .next()
            .map(|title| text_without_details(title).trim().to_string())
            .unwrap_or_default();
        let Some(link) = row
            .select(&overlay_selector)
            .next()
            .and_then(|overlay| overlay.value().attr("href")) else {
            continue;
        };
        let Some(appid) = link
            .find("gamecards")
            .and_then(|index| regex_find!(r#"\d+"#, &link[index..]))
            .and_then(|appid| appid.parse::<AppId>().ok()) else {
            continue;
        };
        let dropped_cards = row
            .select(&drop_info_selector)
            .map(|header| header.text().collect::<String>())
            .find(|text| text.contains("Card drops received"))
            .and_then(|text| {
                regex_find!(r#"\d+"#, &text)
                    .and_then(|count| count.parse::<u32>().ok())
            })
            .unwrap_or(0);

        games.push(FarmableGame {
            name,
            appid,
            playtime,
            remaining_cards,
            dropped_cards,
        });
    }

    Ok(games)
}

/// Joins the assets of an inventory with their descriptions.
pub fn parse_inventory(
    response: GetInventoryResponse,
    contextid: ContextId,
) -> Result<Vec<InventoryItem>> {
    if !response.success {
        return match response.error {
            Some(error) if error.to_lowercase().contains("private") => Err(Error::CookieExpired),
            Some(error) => Err(Error::Response(error)),
            None => Err(Error::InvalidResponse("Inventory request was not successful".into())),
        };
    }

    let mut assets = response.assets.into_iter().collect::<Vec<_>>();

    // Keys are positions in the inventory.
    assets.sort_by_key(|(key, _)| key.parse::<u64>().unwrap_or(u64::MAX));

    assets
        .into_iter()
        .map(|(_key, asset)| {
            let description = response.descriptions
                .get(&asset.description_key())
                .ok_or_else(|| Error::InvalidResponse(format!(
                    "Missing description for {}",
                    asset.description_key(),
                )))?;

            Ok(InventoryItem {
                assetid: asset.id,
                amount: asset.amount,
                icon_url: description.icon_url.clone(),
                name: description.name.clone(),
                item_type: description.item_type.clone(),
                tradable: description.tradable,
                contextid,
            })
        })
        .collect()
}

/// Reads the URL of the new avatar from an upload response.
pub fn parse_avatar_upload(body: &[u8]) -> Result<String> {
    if String::from_utf8_lossy(body).contains(BAD_COOKIE_SENTINEL) {
        return Err(Error::CookieExpired);
    }

    let response: AvatarUploadResponse = parses_body(body)?;

    match response {
        AvatarUploadResponse {
            success: true,
            images: Some(images),
            ..
        } => Ok(images.full),
        AvatarUploadResponse {
            message: Some(message),
            ..
        } => Err(Error::Response(message)),
        _ => Err(Error::InvalidResponse("Avatar upload response has no images".into())),
    }
}

/// Reads the URL of the avatar frame from a profile page.
pub fn parse_avatar_frame(body: &str) -> Result<Option<String>> {
    let document = Html::parse_document(body);
    let frame_selector = selector(".profile_avatar_frame img")?;

    Ok(document
        .select(&frame_selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(String::from))
}

/// Picks the transfer for the community domain, or the first one when none match.
pub fn choose_transfer(
    transfers: Vec<TransferInfo>,
    community_url: &str,
) -> Result<TransferInfo> {
    let community_host = url::Url::parse(community_url)?
        .host_str()
        .map(String::from);
    let is_community = |transfer: &TransferInfo| {
        url::Url::parse(&transfer.url)
            .ok()
            .and_then(|url| url.host_str().map(String::from))
            .is_some_and(|host| Some(host) == community_host)
    };
    let index = transfers
        .iter()
        .position(is_community)
        .unwrap_or(0);

    transfers
        .into_iter()
        .nth(index)
        .ok_or_else(|| Error::InvalidResponse("No transfer info in finalize login response".into()))
}

/// Formats an access token as a `steamLoginSecure` cookie value.
pub fn encode_login_secure(steamid: u64, token: &str) -> String {
    url::form_urlencoded::byte_serialize(format!("{steamid}||{token}").as_bytes())
        .collect()
}
