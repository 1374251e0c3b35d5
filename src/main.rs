use NH3Recovery::Utils::logger::init_logger;
use NH3Recovery::cli::cli_main::run_interactive_menu;
use NH3Recovery::settings::ConfigManager;
use std::process::ExitCode;

/// Optional first argument: path to a JSON configuration file
pub fn main() -> ExitCode {
    let manager = match std::env::args().nth(1) {
        Some(path) => match ConfigManager::with_config_file(&path) {
            Ok(manager) => manager,
            Err(e) => {
                eprintln!("Cannot use configuration file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ConfigManager::new(),
    };
    if let Err(e) = init_logger(&manager.get_config().logging) {
        eprintln!("Cannot start logging: {}", e);
        return ExitCode::FAILURE;
    }
    run_interactive_menu(manager);
    ExitCode::SUCCESS
}
