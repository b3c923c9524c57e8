use std::time::Duration;
use steam_web::{RetryPolicy, SteamWeb};
use steam_web::enums::ProfilePrivacy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = get_env("STEAM_ACCESS_TOKEN");
    let privacy = get_env("STEAM_PRIVACY").parse::<ProfilePrivacy>()?;
    let steam_web = SteamWeb::builder()
        .retry_policy(RetryPolicy::new(3, Duration::from_secs(1)).backoff_factor(2.0))
        .build()?;
    
    steam_web.login(&token).await?;
    steam_web.set_profile_privacy(privacy).await?;
    steam_web.clear_aliases().await?;
    
    println!("Profile is now {privacy}");
    
    if let Some(frame) = steam_web.get_avatar_frame().await? {
        println!("Avatar frame: {frame}");
    }
    
    Ok(())
}

fn get_env(key: &str) -> String {
    dotenv::dotenv().ok();
    
    std::env::var(key)
        .unwrap_or_else(|_| panic!("{key} missing"))
}
