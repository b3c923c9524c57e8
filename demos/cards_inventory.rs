use steam_web::{Session, SteamWeb};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A cookie header containing sessionid and steamLoginSecure.
    let cookies = get_env("STEAM_COOKIES");
    let session = Session::from_cookie_header(&cookies)?;
    let steam_web = SteamWeb::new()?;
    
    steam_web.set_session(session).await?;
    
    let items = steam_web.get_cards_inventory().await?;
    let tradable = items.iter().filter(|item| item.tradable).count();
    
    println!("{} cards in inventory, {tradable} tradable", items.len());
    
    if let Some(item) = items.first() {
        println!("First card: {} ({})", item.name, item.item_type);
    }
    
    Ok(())
}

fn get_env(key: &str) -> String {
    dotenv::dotenv().ok();
    
    std::env::var(key)
        .unwrap_or_else(|_| panic!("{key} missing"))
}
