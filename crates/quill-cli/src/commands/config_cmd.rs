use crate::cli::ConfigCommands;
use crate::config::CliConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init { api_url } => {
            let mut config = CliConfig::load().map_err(CliError::Config)?;
            if api_url.is_some() {
                config.set_api_base_url(api_url);
            }

            let path = config.save().map_err(CliError::Config)?;
            println!("Wrote config to {}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = CliConfig::load().map_err(CliError::Config)?;
            let base_url = config.resolve_api_base_url().map_err(CliError::Config)?;
            println!("api_base_url: {base_url}");
            Ok(())
        }
    }
}
