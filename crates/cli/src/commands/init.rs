//! `ragguard init`: write the default configuration.

use std::path::Path;

use ragguard_config::AppConfig;

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(super::default_config_path);

    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
        println!("Created config directory: {}", dir.display());
    }

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete it and re-run init.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("   1. Set RAGGUARD_TOKEN_SECRET (or auth.token_secret)");
    println!("   2. Set GROQ_API_KEY and OPENAI_API_KEY, or point the providers at Ollama");
    println!("   3. Add users with `ragguard hash-password` or enable auth.demo_users");
    println!("   4. Run: ragguard serve");

    Ok(())
}
