use steam_web::SteamWeb;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = get_env("STEAM_REFRESH_TOKEN");
    let steam_web = SteamWeb::new()?;
    
    steam_web.login(&token).await?;
    
    let games = steam_web.get_farmable_games().await?;
    
    for game in games {
        println!(
            "{} ({}): {} card drops remaining, {} received, {} hours played",
            game.name,
            game.appid,
            game.remaining_cards,
            game.dropped_cards,
            game.playtime,
        );
    }
    
    Ok(())
}

fn get_env(key: &str) -> String {
    dotenv::dotenv().ok();
    
    std::env::var(key)
        .unwrap_or_else(|_| panic!("{key} missing"))
}
