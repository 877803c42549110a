//! `personasmith init` — write a default config file.

use std::path::PathBuf;

use personasmith_config::AppConfig;

pub async fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path.unwrap_or_else(AppConfig::config_path);

    if let Some(dir) = config_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!();
    println!("📝 Next steps:");
    println!("   1. Set PERSONASMITH_API_KEY (or OPENAI_API_KEY), or add api_key to the config");
    println!("   2. Add personas to {}", AppConfig::default().store_path().display());
    println!("   3. Run: personasmith update <persona_id> <requirement>");

    Ok(())
}
