use crate::MassTransfer::mass_transfer_rates::MassTransferParameter;
use crate::gui::gui_main::gui_main;
use crate::session::AmmoniaSession;
use crate::settings::ConfigManager;
use log::error;
use std::io::{self, Write};

/// rows of the mass-transfer table printed on the console
const TABLE_ROWS: usize = 20;

pub fn run_interactive_menu(mut manager: ConfigManager) {
    let mut session = AmmoniaSession::new(manager.get_config().clone());
    loop {
        show_main_menu(&session);
        let Some(choice) = get_user_input() else {
            break;
        };
        match choice.trim() {
            "1" => load_dataset(&mut session),
            "2" => show_forecast(&session),
            "3" => set_parameter(&mut session),
            "4" => show_mass_transfer(&session),
            "5" => save_slider_defaults(&session, &mut manager),
            "6" => reset_configuration(&mut manager),
            "7" => {
                if let Err(e) = gui_main(session.config().clone()) {
                    eprintln!("GUI error: {}", e);
                }
            }
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - header
Yellow (\x1b[33m) - menu options
Cyan (\x1b[36m) - prompts
Red (\x1b[31m) - errors
*/
fn show_main_menu(session: &AmmoniaSession) {
    println!("\x1b[34m\n Optimized Ammonia Recovery Process \n\x1b[0m");
    if !session.status().is_empty() {
        println!("{}", session.status());
    }
    let params = session.params();
    println!(
        "k_G = {}, k_L = {}, P_A = {}, pH = {}",
        params.k_G, params.k_L, params.P_A, params.pH
    );
    println!("\x1b[33m1. Load CSV dataset\x1b[0m");
    println!("\x1b[33m2. Show forecast metrics\x1b[0m");
    println!("\x1b[33m3. Set mass-transfer parameter\x1b[0m");
    println!("\x1b[33m4. Show mass-transfer rates\x1b[0m");
    println!("\x1b[33m5. Save current parameters as defaults\x1b[0m");
    println!("\x1b[33m6. Reset configuration file to defaults\x1b[0m");
    println!("\x1b[33m7. GUI\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    let _ = io::stdout().flush();
}

fn report_error(e: &dyn std::fmt::Display) {
    error!("{}", e);
    eprintln!("\x1b[31m{}\x1b[0m", e);
}

/// `None` on end of input or a read error
fn get_user_input() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(e) => {
            report_error(&e);
            None
        }
    }
}

fn load_dataset(session: &mut AmmoniaSession) {
    prompt("Enter CSV file path: ");
    let Some(path) = get_user_input() else {
        return;
    };
    match session.load_dataset(path.trim()) {
        Ok(()) => {
            println!("{}", session.status());
            show_forecast(session);
        }
        Err(e) => report_error(&e),
    }
}

fn show_forecast(session: &AmmoniaSession) {
    match session.forecast() {
        Some(forecast) => {
            forecast.pretty_print();
            println!("{}", forecast.metrics_text());
        }
        None => println!("No dataset loaded."),
    }
}

/// Accepts the menu number (1-4), the key ("k_g") or the label ("k_G")
pub fn parse_parameter_choice(input: &str) -> Option<MassTransferParameter> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if (1..=MassTransferParameter::ALL.len()).contains(&n) => {
            Some(MassTransferParameter::ALL[n - 1])
        }
        Ok(_) => None,
        Err(_) => MassTransferParameter::from_key(input),
    }
}

fn set_parameter(session: &mut AmmoniaSession) {
    for (i, parameter) in MassTransferParameter::ALL.iter().enumerate() {
        let spec = session.config().sliders.get(*parameter);
        println!(
            "\x1b[33m{}. {}\x1b[0m  slider {}..={}, now {} -> {}",
            i + 1,
            parameter,
            spec.min,
            spec.max,
            session.raw_value(*parameter),
            session.params().get(*parameter)
        );
    }
    prompt("Parameter: ");
    let Some(choice) = get_user_input() else {
        return;
    };
    let Some(parameter) = parse_parameter_choice(&choice) else {
        println!("Unknown parameter: {}", choice.trim());
        return;
    };
    prompt("Slider position: ");
    let Some(raw) = get_user_input() else {
        return;
    };
    let raw = match raw.trim().parse::<i32>() {
        Ok(raw) => raw,
        Err(e) => {
            println!("Not an integer: {} ({})", raw.trim(), e);
            return;
        }
    };
    match session.set_parameter(parameter, raw) {
        Ok(Some(result)) => result.pretty_print(Some(TABLE_ROWS)),
        Ok(None) => println!(
            "{} set to {}; load a dataset to compute the rates",
            parameter.label(),
            session.params().get(parameter)
        ),
        Err(e) => report_error(&e),
    }
}

fn show_mass_transfer(session: &AmmoniaSession) {
    match session.mass_transfer() {
        Some(result) => result.pretty_print(Some(TABLE_ROWS)),
        None => println!("No dataset loaded."),
    }
}

fn save_slider_defaults(session: &AmmoniaSession, manager: &mut ConfigManager) {
    for parameter in MassTransferParameter::ALL {
        if let Err(e) = manager.set_slider_default(parameter, session.raw_value(parameter)) {
            report_error(&e);
            return;
        }
    }
    match manager.save_config() {
        Ok(()) => println!("Saved to {}", manager.config_file().display()),
        Err(e) => report_error(&e),
    }
}

/// Writes the built-in defaults to the configuration file; the running session keeps its values
fn reset_configuration(manager: &mut ConfigManager) {
    manager.reset_to_defaults();
    match manager.save_config() {
        Ok(()) => println!(
            "Defaults written to {}, they apply from the next start",
            manager.config_file().display()
        ),
        Err(e) => report_error(&e),
    }
}
