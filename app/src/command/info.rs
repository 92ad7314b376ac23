use sophia_config::Config;

/// Strategy for displaying the effective configuration, secrets masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== sophia Configuration ===\n");

        println!("Telegram:");
        println!("  Token: {}", mask_secret(&config.telegram.token));
        println!();

        println!("Model:");
        println!("  Endpoint: {}", config.model.api_url);
        println!(
            "  API Key: {}",
            config.model.api_key.as_deref().map_or_else(
                || "(not set - no Authorization header)".to_string(),
                mask_secret
            )
        );
        println!("  Name: {}", config.model.name);
        println!(
            "  History: {} turn pairs ({} messages)",
            config.model.max_history,
            config.model.max_history * 2
        );
        println!("  Timeout: {}s", config.model.timeout_secs);

        if let Ok(path) = Config::config_path() {
            println!();
            let state = if path.exists() { "" } else { " (absent)" };
            println!("Config file: {}{state}", path.display());
        }

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        "(not set)".to_string()
    } else if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
