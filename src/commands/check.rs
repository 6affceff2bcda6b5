use anyhow::Result;
use bdaycal_core::BdayCalConfig;
use bdaycal_provider_carddav::CardDavClient;
use owo_colors::OwoColorize;

pub async fn run(config: &BdayCalConfig) -> Result<()> {
    let credentials = config.credentials()?;
    let client = CardDavClient::new()?;

    println!("Checking {}...\n", credentials.endpoint_url);

    let discovered = client.check(&credentials, config.timeout()?).await?;

    println!("{} {}", "Principal:".dimmed(), discovered.principal);
    println!("{} {}", "Home:".dimmed(), discovered.home);
    println!(
        "{} {}",
        "Address books:".dimmed(),
        discovered.address_books.len()
    );
    for book in &discovered.address_books {
        println!("  {}", book);
    }

    println!("\n{}", "Connection OK".green());
    Ok(())
}
