use clap::Subcommand;
use tickdown_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set a config value
    Set {
        /// Config key ("default_minutes" or "wakeup_retry_cap")
        key: String,
        /// New value
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "default_minutes" => config.default_minutes = parse_positive(&value)?,
                "wakeup_retry_cap" => config.wakeup_retry_cap = parse_positive(&value)?,
                _ => return Err(format!("unknown config key: {key}").into()),
            }
            config.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn parse_positive(value: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let n: u32 = value.parse()?;
    if n == 0 {
        return Err("value must be a positive integer".into());
    }
    Ok(n)
}
