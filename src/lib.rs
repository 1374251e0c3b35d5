#[allow(non_snake_case)]
pub mod AmmoniaData;
#[allow(non_snake_case)]
pub mod Forecast;
#[allow(non_snake_case)]
pub mod MassTransfer;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod error;
pub mod gui;
pub mod session;
pub mod settings;
