//! `workmatch status`: Show configuration and store status.

use super::load_config;
use workmatch_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    println!("workmatch status");
    println!("================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Session TTL:    {} min (completed kept {} min)", config.session.ttl_minutes, config.session.completed_grace_minutes);
    println!("  Sweep every:    {} s", config.session.cleanup_interval_secs);
    println!("  Merge margin:   {:.2}", config.merge.confidence_margin);
    println!(
        "  Ranking:        min score {:.2}, page {}, overflow {}, fetch {}",
        config.ranking.min_score,
        config.ranking.page_size,
        config.ranking.overflow_limit,
        config.ranking.fetch_limit
    );
    println!("  Store backend:  {}", config.store.backend);

    if config.store.backend != "memory" {
        let path = config.store.resolved_path();
        if path.exists() {
            let size_kb = std::fs::metadata(&path)?.len() as f64 / 1024.0;
            println!("  Store file:     {} ({size_kb:.1} KB)", path.display());
        } else {
            println!("  Store file:     {} (not created yet)", path.display());
        }
    }

    match workmatch_store::open_provider(&config.store).await {
        Ok(provider) => println!("\n  ✅ Provider `{}` opened", provider.name()),
        Err(e) => println!("\n  ❌ Provider unavailable: {e}"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, run `workmatch onboard` first");
    }

    Ok(())
}
