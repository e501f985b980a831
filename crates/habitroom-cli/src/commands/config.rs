//! Streak and habit defaults stored in `config.toml`.

use clap::Subcommand;
use habitroom_core::Config;
use serde_json::json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. "streak.strict_gap_policy"
    Get {
        /// Dot-separated key
        key: String,
    },
    /// Change one value and save it
    Set {
        /// Dot-separated key
        key: String,
        /// New value (weekly goals are clamped to 1-7)
        value: String,
    },
    /// Print the config file location and every value
    List,
    /// Print the config file location
    Path,
    /// Restore strict gap policy and a weekly goal of 1
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            // Print what was stored, which differs from the input when a goal is clamped.
            let stored = config.get(&key).unwrap_or(value);
            tracing::info!(%key, %stored, "config updated");
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let out = json!({
                "path": Config::path()?,
                "streak": config.streak,
                "habits": config.habits,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("reset {}", Config::path()?.display());
        }
    }
    Ok(())
}
