use anyhow::Result;
use calsync_core::config::SyncConfig;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = SyncConfig::config_path()?;
    let config = SyncConfig::load()?;
    let provider = config.provider();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  Provider:   {}", provider.binary_name());
    println!("  Time zone:  {}", config.timezone);
    println!("  Timeout:    {}s", config.provider_timeout_secs);
    println!("  Scope:      {}", config.scope_id.as_deref().unwrap_or("(none)"));
    println!("  Port:       {}", config.server_port);

    Ok(())
}

pub fn init() -> Result<()> {
    let config_path = SyncConfig::config_path()?;

    if config_path.exists() {
        anyhow::bail!("Config already exists: {}", config_path.display());
    }

    SyncConfig::create_default_config(&config_path)?;
    println!("{}", format!("Created {}", config_path.display()).green());

    Ok(())
}
