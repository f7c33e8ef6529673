use anyhow::{bail, Result};
use sats_market::client::MarketClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let base_url =
        std::env::var("MARKET_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let search = std::env::var("ALBUM_SEARCH").ok();

    println!("sats-market Buyer Agent");
    println!("=======================");
    println!("Server: {}", base_url);
    println!();

    let client = MarketClient::new(&base_url);

    let quote = client.rate().await?;
    println!(
        "BTC/USD: {:.2}{}",
        quote.usd_per_btc,
        if quote.stale { " (stale)" } else { "" }
    );
    println!();

    println!("Step 1: Browsing albums...");
    let listing = client.list_albums(search.as_deref()).await?;
    let Some(album) = listing.albums.first() else {
        bail!("No albums available to buy");
    };
    println!(
        "   [OK] {} by {}: ${:.2} ({} sats)",
        album.title,
        album.artist_name,
        album.price_usd,
        album
            .price_sats
            .map(|s| s.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!();

    println!("Step 2: Requesting Lightning invoice...");
    let invoice = client.create_invoice(album.id).await?;
    println!("   [OK] {} sats", invoice.amount_sats);
    println!("   Payment request: {}", invoice.payment_request);
    println!("   Expires at: {}", invoice.expires_at);
    println!();

    println!("Step 3: Verifying payment...");
    match client.verify_purchase(&invoice.payment_hash, album.id).await {
        Ok(purchase) => {
            println!("[SUCCESS] Purchase recorded:");
            println!("{}", serde_json::to_string_pretty(&purchase)?);
        }
        Err(e) => {
            println!("[FAILED] {}", e);
            println!("Pay the invoice and run again, or start the server with MOCK_AUTO_SETTLE=true");
        }
    }

    Ok(())
}
