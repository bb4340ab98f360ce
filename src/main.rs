mod interface;
mod thresholds;
mod alarm;
mod worker;
mod gui;

use eframe::egui;
use env_logger;
use gui::PharmacyDashboard;
use interface::DashboardConfig;


fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cfg : DashboardConfig = match confy::load("pharmacy-dashboard", None) {
    Ok( cfg ) => cfg,
    Err( e ) => {
      log::error!("Failed to load configuration : {}. Using defaults.", e);
      DashboardConfig::default()
    },
  };

  let mut native_options = eframe::NativeOptions::default();
  native_options.initial_window_size = Some( egui::vec2(1280.0, 800.0) );

  if let Err( e ) = eframe::run_native(
      "Pharmacy Environment Monitor",
      native_options,
      Box::new(move |cc| Box::new(PharmacyDashboard::new(cc, cfg)) )
    )  {
    log::error!("Failed to run Pharmacy Environment Monitor {:?}", e);
  };
}
