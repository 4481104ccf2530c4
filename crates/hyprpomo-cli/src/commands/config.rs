use clap::Subcommand;
use hyprpomo_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Path => {
            let path = Config::path()?;
            // Creates the file with defaults if it is missing.
            Config::load_or_default_from(&path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
