use serde::{Serialize, Deserialize};
use chrono::{DateTime, Local};
use std::option::Option;

use crate::thresholds::UnitThresholds;

#[derive(Default, Debug, Clone)]
pub struct MonitorState {
  pub units : Vec<UnitSnapshot>,
  pub history : Vec<HistoryPoint>,
  pub settings : Vec<UnitThresholds>,
  pub last_refresh : Option<DateTime<Local>>,
  pub error : Option<String>,
}

#[derive(Default, Debug, Clone)]
pub struct UnitSnapshot {
  pub guid : String,
  pub name : String,
  // temp/humidity already have the unit offsets applied
  pub temp : f64,
  pub humidity : f64,
  pub raw_temp : f64,
  pub raw_humidity : f64,
  pub add_time : String,
  pub thresholds : UnitThresholds,
}

#[derive(Default, Debug, Clone)]
pub struct HistoryPoint {
  pub name : String,
  pub temp : f64,
  pub humidity : f64,
  pub add_time : String,
  pub hour : f64,
}

#[derive(Debug)]
pub enum MonitorCommand {
  Refresh,
  UpdateSettings( Vec<UnitThresholds> ),
  AddSetting( UnitThresholds ),
  DeleteSetting( String ),
}

#[derive(Serialize, Deserialize)]
pub struct DashboardConfig {
  pub api_base_url : String,
  pub poll_interval_secs : u64,
  pub request_timeout_secs : u64,
  pub language : String,
}

impl Default for DashboardConfig {
  fn default() -> DashboardConfig {
    DashboardConfig {
      api_base_url : String::from("http://127.0.0.1:5000"),
      poll_interval_secs : 300,
      request_timeout_secs : 10,
      language : String::from("zh"),
    }
  }
}
