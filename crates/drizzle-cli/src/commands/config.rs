//! Print a configuration

use anyhow::{bail, Context, Result};
use drizzle_core::OverlayConfig;
use drizzle_overlay::{ConfigSource, FileSource};

pub fn run(path: Option<&str>, format: &str) -> Result<()> {
    let config = match path {
        Some(path) => {
            let source = FileSource::new(path);
            source
                .fetch_config()
                .with_context(|| format!("Failed to load configuration from {}", path))?
        }
        None => OverlayConfig::default(),
    };
    println!("{}", render(&config, format)?);
    Ok(())
}

fn render(config: &OverlayConfig, format: &str) -> Result<String> {
    match format {
        "toml" => Ok(config.to_toml_string()?),
        "json" => Ok(serde_json::to_string_pretty(config)?),
        other => bail!("unknown format '{}'; valid values: toml, json", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_round_trips_defaults() {
        let config = OverlayConfig::default();
        let toml_text = render(&config, "toml").unwrap();
        assert_eq!(OverlayConfig::from_toml_str(&toml_text).unwrap(), config);

        let json_text = render(&config, "json").unwrap();
        assert!(json_text.contains("\"max_emojis_on_screen\": 200"));
        assert!(render(&config, "yaml").is_err());
    }
}
