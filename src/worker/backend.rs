use reqwest;
use serde::{Serialize, Deserialize};
use serde::de::{DeserializeOwned, IgnoredAny};
use chrono::{Local, NaiveDateTime, Timelike};
use std::option::Option;

use crate::interface::{UnitSnapshot, HistoryPoint};
use crate::thresholds::{UnitThresholds, RawReading, compensate};

// Every backend endpoint is a POST answering the same envelope. Numeric
// payload fields come in as strings; parsing falls back to the documented
// defaults instead of failing the whole refresh.

#[derive(Deserialize, Debug)]
struct ApiEnvelope<T> {
  #[serde(rename = "Code")]
  code : i32,
  #[serde(rename = "Result", default)]
  result : Option<String>,
  #[serde(rename = "Data")]
  data : Option<T>,
}

#[derive(Deserialize, Debug, Default)]
struct UnitPayload {
  #[serde(rename = "GUID", default)]
  guid : String,
  #[serde(rename = "IP", default)]
  ip : String,
  #[serde(default)]
  name : String,
  #[serde(default)]
  temp_max : Option<String>,
  #[serde(default)]
  temp_min : Option<String>,
  #[serde(default)]
  temp_offset : Option<String>,
  #[serde(default)]
  humidity_max : Option<String>,
  #[serde(default)]
  humidity_min : Option<String>,
  #[serde(default)]
  humidity_offset : Option<String>,
  #[serde(default)]
  alert : Option<String>,
  #[serde(default)]
  mail : Option<String>,
  #[serde(rename = "temperatureClasses", default)]
  temperature_classes : Vec<ReadingPayload>,
}

#[derive(Deserialize, Debug, Default)]
struct ReadingPayload {
  #[serde(default)]
  temp : Option<String>,
  #[serde(default)]
  humidity : Option<String>,
  #[serde(default)]
  add_time : String,
}

#[derive(Serialize)]
struct EmptyRequest {}

#[derive(Serialize)]
struct ValueAryRequest {
  #[serde(rename = "ValueAry")]
  value_ary : Vec<String>,
}

#[derive(Serialize)]
struct DataRequest<T> {
  #[serde(rename = "Data")]
  data : T,
}

// outgoing settings keep the backend's stringly-typed shape
#[derive(Serialize, Debug)]
struct SettingPayload {
  #[serde(rename = "GUID")]
  guid : String,
  #[serde(rename = "IP")]
  ip : String,
  name : String,
  temp_max : String,
  temp_min : String,
  temp_offset : String,
  humidity_max : String,
  humidity_min : String,
  humidity_offset : String,
  alert : String,
  mail : String,
}

pub async fn get_latest_today(client : &reqwest::Client, base_url : &str) -> Result<Vec<UnitSnapshot>, String> {
  let units : Vec<UnitPayload> =
    post_query(client, base_url, "/api/temperature/get_latest_today", &EmptyRequest {}).await?;

  Ok( units.iter().map(snapshot_from_payload).collect() )
}

pub async fn get_temp_by_time(
  client : &reqwest::Client,
  base_url : &str,
  start : &str,
  end : &str) -> Result<Vec<HistoryPoint>, String>
{
  let body = ValueAryRequest { value_ary : vec![start.to_string(), end.to_string()] };
  let units : Vec<UnitPayload> =
    post_query(client, base_url, "/api/temperature/get_temp_by_time", &body).await?;

  Ok( units.iter().flat_map(history_from_payload).collect() )
}

pub async fn get_today_history(client : &reqwest::Client, base_url : &str) -> Result<Vec<HistoryPoint>, String> {
  let now = Local::now();
  let start = now.format("%Y-%m-%d 00:00:00").to_string();
  let end = now.format("%Y-%m-%d %H:%M:%S").to_string();

  get_temp_by_time(client, base_url, &start, &end).await
}

pub async fn get_settings(client : &reqwest::Client, base_url : &str) -> Result<Vec<UnitThresholds>, String> {
  let units : Vec<UnitPayload> =
    post_query(client, base_url, "/api/temperature/get_set", &EmptyRequest {}).await?;

  Ok( units.iter().map(thresholds_from_payload).collect() )
}

pub async fn update_settings(
  client : &reqwest::Client,
  base_url : &str,
  settings : &[UnitThresholds]) -> Result<(), String>
{
  let body = DataRequest { data : settings.iter().map(payload_from_thresholds).collect::<Vec<_>>() };
  post_command(client, base_url, "/api/temperature/update_set", &body).await
}

pub async fn add_setting(
  client : &reqwest::Client,
  base_url : &str,
  setting : &UnitThresholds) -> Result<(), String>
{
  let body = DataRequest { data : payload_from_thresholds(setting) };
  post_command(client, base_url, "/api/temperature/add_set", &body).await
}

pub async fn delete_setting(client : &reqwest::Client, base_url : &str, guid : &str) -> Result<(), String> {
  let body = ValueAryRequest { value_ary : vec![guid.to_string()] };
  post_command(client, base_url, "/api/temperature/delete_set", &body).await
}

async fn post_query<B, T>(
  client : &reqwest::Client,
  base_url : &str,
  path : &str,
  body : &B) -> Result<T, String>
  where B : Serialize, T : DeserializeOwned
{
  let envelope = post_envelope::<B, T>(client, base_url, path, body).await?;
  match envelope.data {
    None => Err( format!("Backend returned no data for {}", path) ),
    Some( data ) => Ok( data ),
  }
}

async fn post_command<B : Serialize>(
  client : &reqwest::Client,
  base_url : &str,
  path : &str,
  body : &B) -> Result<(), String>
{
  post_envelope::<B, IgnoredAny>(client, base_url, path, body).await.map(|_| ())
}

async fn post_envelope<B, T>(
  client : &reqwest::Client,
  base_url : &str,
  path : &str,
  body : &B) -> Result<ApiEnvelope<T>, String>
  where B : Serialize, T : DeserializeOwned
{
  let url = format!("{}{}", base_url.trim_end_matches('/'), path);

  let response = client.post(&url)
    .json(body)
    .send().await
    .map_err(|e| format!("Request to {} failed : {}", path, e))?;

  let envelope : ApiEnvelope<T> = response.json().await
    .map_err(|e| format!("Bad response from {} : {}", path, e))?;

  if envelope.code != 200 {
    return Err( envelope.result.clone()
      .unwrap_or_else(|| format!("Backend returned code {} for {}", envelope.code, path)) );
  }

  Ok( envelope )
}

// readings path: bounds fall back to the display defaults
fn snapshot_from_payload(unit : &UnitPayload) -> UnitSnapshot {
  let thresholds = UnitThresholds {
    guid : unit.guid.clone(),
    ip : unit.ip.clone(),
    name : unit.name.clone(),
    temp_max : parse_f64_or(&unit.temp_max, 25.0),
    temp_min : parse_f64_or(&unit.temp_min, 15.0),
    temp_offset : parse_f64_or(&unit.temp_offset, 0.0),
    humidity_max : parse_f64_or(&unit.humidity_max, 70.0),
    humidity_min : parse_f64_or(&unit.humidity_min, 40.0),
    humidity_offset : parse_f64_or(&unit.humidity_offset, 0.0),
    alert : parse_flag(&unit.alert),
    mail : parse_flag(&unit.mail),
  };

  let (raw, add_time) = match unit.temperature_classes.first() {
    None => {
      log::warn!("Unit {} has no readings today", unit.name);
      ( RawReading::default(), Local::now().format("%Y-%m-%d %H:%M:%S").to_string() )
    },
    Some( reading ) => (
      RawReading {
        temp : parse_f64_or(&reading.temp, 0.0),
        humidity : parse_f64_or(&reading.humidity, 0.0),
      },
      reading.add_time.clone(),
    ),
  };

  let compensated = compensate(&raw, &thresholds);

  UnitSnapshot {
    guid : unit.guid.clone(),
    name : unit.name.clone(),
    temp : compensated.temp,
    humidity : compensated.humidity,
    raw_temp : raw.temp,
    raw_humidity : raw.humidity,
    add_time,
    thresholds,
  }
}

fn history_from_payload(unit : &UnitPayload) -> Vec<HistoryPoint> {
  let temp_offset = parse_f64_or(&unit.temp_offset, 0.0);
  let humidity_offset = parse_f64_or(&unit.humidity_offset, 0.0);

  unit.temperature_classes.iter().map(|reading| {
    HistoryPoint {
      name : unit.name.clone(),
      temp : parse_f64_or(&reading.temp, 0.0) + temp_offset,
      humidity : parse_f64_or(&reading.humidity, 0.0) + humidity_offset,
      add_time : reading.add_time.clone(),
      hour : hour_of_day(&reading.add_time),
    }
  }).collect()
}

// settings-list path: wide-open fallbacks so a half-configured unit never
// alarms spuriously
fn thresholds_from_payload(unit : &UnitPayload) -> UnitThresholds {
  UnitThresholds {
    guid : unit.guid.clone(),
    ip : unit.ip.clone(),
    name : unit.name.clone(),
    temp_max : parse_f64_or(&unit.temp_max, 100.0),
    temp_min : parse_f64_or(&unit.temp_min, 0.0),
    temp_offset : parse_f64_or(&unit.temp_offset, 0.0),
    humidity_max : parse_f64_or(&unit.humidity_max, 100.0),
    humidity_min : parse_f64_or(&unit.humidity_min, 0.0),
    humidity_offset : parse_f64_or(&unit.humidity_offset, 0.0),
    alert : parse_flag(&unit.alert),
    mail : parse_flag(&unit.mail),
  }
}

fn payload_from_thresholds(thresholds : &UnitThresholds) -> SettingPayload {
  SettingPayload {
    guid : thresholds.guid.clone(),
    ip : thresholds.ip.clone(),
    name : thresholds.name.clone(),
    temp_max : format!("{}", thresholds.temp_max),
    temp_min : format!("{}", thresholds.temp_min),
    temp_offset : format!("{}", thresholds.temp_offset),
    humidity_max : format!("{}", thresholds.humidity_max),
    humidity_min : format!("{}", thresholds.humidity_min),
    humidity_offset : format!("{}", thresholds.humidity_offset),
    alert : flag_string(thresholds.alert),
    mail : flag_string(thresholds.mail),
  }
}

fn parse_f64_or(value : &Option<String>, fallback : f64) -> f64 {
  match value {
    None => fallback,
    Some( s ) => match s.trim().parse::<f64>() {
      Ok( v ) if v.is_finite() => v,
      _ => fallback,
    },
  }
}

fn parse_flag(value : &Option<String>) -> bool {
  matches!(value.as_deref(), Some( "True" ))
}

fn flag_string(value : bool) -> String {
  String::from(if value { "True" } else { "False" })
}

fn hour_of_day(add_time : &str) -> f64 {
  match NaiveDateTime::parse_from_str(add_time, "%Y-%m-%d %H:%M:%S") {
    Ok( t ) => t.time().num_seconds_from_midnight() as f64 / 3600.0,
    Err( _ ) => {
      log::debug!("Unparseable reading time : {}", add_time);
      0.0
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn unit_json() -> &'static str {
    r#"{
      "GUID": "u-1",
      "IP": "10.0.0.7",
      "name": "Fridge A",
      "temp_max": "25",
      "temp_min": "15",
      "temp_offset": "2",
      "humidity_max": "70",
      "humidity_min": "40",
      "humidity_offset": "-5",
      "alert": "True",
      "mail": "False",
      "temperatureClasses": [
        { "temp": "24", "humidity": "50", "add_time": "2026-08-05 14:30:00" },
        { "temp": "23.5", "humidity": "49", "add_time": "2026-08-05 14:25:00" }
      ]
    }"#
  }

  #[test]
  fn snapshot_applies_offsets_to_the_newest_reading() {
    let unit : UnitPayload = serde_json::from_str(unit_json()).unwrap();
    let snapshot = snapshot_from_payload(&unit);

    assert_eq!( snapshot.name, "Fridge A" );
    assert_eq!( snapshot.raw_temp, 24.0 );
    assert_eq!( snapshot.temp, 26.0 );
    assert_eq!( snapshot.raw_humidity, 50.0 );
    assert_eq!( snapshot.humidity, 45.0 );
    assert_eq!( snapshot.add_time, "2026-08-05 14:30:00" );
    assert!( snapshot.thresholds.alert );
    assert!( !snapshot.thresholds.mail );
  }

  #[test]
  fn history_compensates_every_point() {
    let unit : UnitPayload = serde_json::from_str(unit_json()).unwrap();
    let points = history_from_payload(&unit);

    assert_eq!( points.len(), 2 );
    assert_eq!( points[0].temp, 26.0 );
    assert_eq!( points[1].temp, 25.5 );
    assert_eq!( points[0].humidity, 45.0 );
    assert!( (points[0].hour - 14.5).abs() < 1e-9 );
  }

  #[test]
  fn missing_and_garbage_numbers_fall_back() {
    let unit : UnitPayload = serde_json::from_str(r#"{
      "GUID": "u-2",
      "name": "Fridge B",
      "temp_max": "abc",
      "humidity_offset": "NaN",
      "alert": "False",
      "temperatureClasses": []
    }"#).unwrap();

    let snapshot = snapshot_from_payload(&unit);
    assert_eq!( snapshot.thresholds.temp_max, 25.0 );
    assert_eq!( snapshot.thresholds.temp_min, 15.0 );
    assert_eq!( snapshot.thresholds.humidity_offset, 0.0 );
    assert_eq!( snapshot.raw_temp, 0.0 );
    assert!( !snapshot.thresholds.alert );

    let settings = thresholds_from_payload(&unit);
    assert_eq!( settings.temp_max, 100.0 );
    assert_eq!( settings.temp_min, 0.0 );
    assert_eq!( settings.humidity_max, 100.0 );
  }

  #[test]
  fn envelope_codes_other_than_200_are_errors() {
    let envelope : ApiEnvelope<Vec<UnitPayload>> = serde_json::from_str(r#"{
      "Code": 500,
      "Result": "boom",
      "Data": null
    }"#).unwrap();

    assert_eq!( envelope.code, 500 );
    assert_eq!( envelope.result.as_deref(), Some( "boom" ) );
    assert!( envelope.data.is_none() );
  }

  #[test]
  fn settings_round_trip_keeps_the_backend_shape() {
    let mut thresholds = UnitThresholds::default();
    thresholds.guid = String::from("u-3");
    thresholds.temp_offset = -1.5;
    thresholds.alert = false;

    let payload = payload_from_thresholds(&thresholds);
    assert_eq!( payload.guid, "u-3" );
    assert_eq!( payload.temp_offset, "-1.5" );
    assert_eq!( payload.alert, "False" );
    assert_eq!( payload.mail, "True" );
  }
}
