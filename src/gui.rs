pub mod gui_main;
pub mod gui_plot;
