//! Logs in to Steam Community and performs account actions over the web.
//!
//! ```no_run
//! use steam_web::SteamWeb;
//!
//! # async fn run() -> Result<(), steam_web::Error> {
//! let steam_web = SteamWeb::new()?;
//! // An access token or a refresh token.
//! let session = steam_web.login("eyJ...").await?;
//! let games = steam_web.get_farmable_games().await?;
//!
//! println!("Logged in as {}", session.steamid);
//!
//! for game in games {
//!     println!("{} has {} card drops remaining", game.name, game.remaining_cards);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod crypto;
mod helpers;
mod login;
mod retry;
mod serialize;
mod session;

pub mod enums;
pub mod error;
pub mod response;
pub mod token;
pub mod types;

pub use api::{parse_farmable_games, SteamWeb, SteamWebBuilder};
pub use error::{Error, ParseHtmlError, Result};
pub use login::LoginMethod;
pub use retry::RetryPolicy;
pub use session::Session;
pub use steamid_ng::SteamID;
pub use reqwest;
pub use reqwest_middleware;
