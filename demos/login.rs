use steam_web::SteamWeb;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = get_env("STEAM_REFRESH_TOKEN");
    let steam_web = SteamWeb::new()?;
    let session = steam_web.login(&token).await?;
    // Sessions can be saved and restored later with set_session.
    let json = serde_json::to_string(&session)?;
    
    println!("Logged in as {}", session.steamid);
    println!("{json}");
    
    let notifications = steam_web.get_notifications().await?;
    
    println!("{} unread notifications", notifications.total());
    
    steam_web.logout().await;
    
    Ok(())
}

fn get_env(key: &str) -> String {
    dotenv::dotenv().ok();
    
    std::env::var(key)
        .unwrap_or_else(|_| panic!("{key} missing"))
}
