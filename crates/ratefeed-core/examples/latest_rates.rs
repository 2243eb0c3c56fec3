//! Fetch the latest rates for a base currency and run one conversion.
//!
//! ```text
//! cargo run --example latest_rates
//! RUST_LOG=ratefeed_core=debug cargo run --example latest_rates
//! ```

use ratefeed_core::RegistryBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratefeed_core=info".into()),
        )
        .init();

    let registry = RegistryBuilder::new().build();
    let provider = registry.resolve_default()?;

    let record = provider.latest_rates("USD").await?;
    println!(
        "latest {} rates from {} ({} currencies):",
        record.base(),
        record.source(),
        record.rates().len()
    );
    for (code, rate) in record.rates().iter().take(5) {
        println!("  1 {} = {rate} {code}", record.base());
    }

    let eur = provider.convert(100.0, "USD", "EUR").await?;
    println!("100 USD = {eur:.2} EUR");

    // A second identical call is served from the hour-long cache.
    provider.latest_rates("USD").await?;

    Ok(())
}
