// Per-unit alert thresholds and the pure compensate/evaluate step used by
// every rendered unit card. Comparisons are strict: a value sitting exactly
// on min or max is still in range.

#[derive(Debug, Clone, PartialEq)]
pub struct UnitThresholds {
  pub guid : String,
  pub ip : String,
  pub name : String,
  pub temp_max : f64,
  pub temp_min : f64,
  pub temp_offset : f64,
  pub humidity_max : f64,
  pub humidity_min : f64,
  pub humidity_offset : f64,
  pub alert : bool,
  pub mail : bool,
}

impl Default for UnitThresholds {
  fn default() -> UnitThresholds {
    UnitThresholds {
      guid : String::new(),
      ip : String::new(),
      name : String::from("Default"),
      temp_max : 25.0,
      temp_min : 15.0,
      temp_offset : 2.0,
      humidity_max : 70.0,
      humidity_min : 40.0,
      humidity_offset : 10.0,
      alert : true,
      mail : true,
    }
  }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
  pub temp : f64,
  pub humidity : f64,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct CompensatedReading {
  pub temp : f64,
  pub humidity : f64,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct AlertVerdict {
  pub temp_alert : bool,
  pub humidity_alert : bool,
  pub has_alert : bool,
  pub should_sound : bool,
}

pub fn compensate(reading : &RawReading, thresholds : &UnitThresholds) -> CompensatedReading {
  CompensatedReading {
    temp : reading.temp + thresholds.temp_offset,
    humidity : reading.humidity + thresholds.humidity_offset,
  }
}

pub fn evaluate(reading : &CompensatedReading, thresholds : &UnitThresholds) -> AlertVerdict {
  let temp_alert = reading.temp > thresholds.temp_max || reading.temp < thresholds.temp_min;
  let humidity_alert = reading.humidity > thresholds.humidity_max || reading.humidity < thresholds.humidity_min;
  let has_alert = temp_alert || humidity_alert;

  AlertVerdict {
    temp_alert,
    humidity_alert,
    has_alert,
    should_sound : has_alert && thresholds.alert,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn thresholds() -> UnitThresholds {
    UnitThresholds {
      temp_max : 25.0,
      temp_min : 15.0,
      temp_offset : 0.0,
      humidity_max : 70.0,
      humidity_min : 40.0,
      humidity_offset : 0.0,
      ..UnitThresholds::default()
    }
  }

  #[test]
  fn values_on_the_boundary_are_in_range() {
    let t = thresholds();

    for temp in [15.0, 25.0] {
      let reading = CompensatedReading { temp, humidity : 50.0 };
      let verdict = evaluate(&reading, &t);
      assert!( !verdict.temp_alert, "temp {} must not alarm", temp );
      assert!( !verdict.has_alert );
    }

    for humidity in [40.0, 70.0] {
      let reading = CompensatedReading { temp : 20.0, humidity };
      assert!( !evaluate(&reading, &t).humidity_alert, "humidity {} must not alarm", humidity );
    }
  }

  #[test]
  fn values_past_the_boundary_alarm() {
    let t = thresholds();

    let hot = evaluate(&CompensatedReading { temp : 25.1, humidity : 50.0 }, &t);
    assert!( hot.temp_alert && hot.has_alert && hot.should_sound );

    let cold = evaluate(&CompensatedReading { temp : 14.9, humidity : 50.0 }, &t);
    assert!( cold.temp_alert );

    let damp = evaluate(&CompensatedReading { temp : 20.0, humidity : 70.5 }, &t);
    assert!( damp.humidity_alert && !damp.temp_alert );

    let dry = evaluate(&CompensatedReading { temp : 20.0, humidity : 39.9 }, &t);
    assert!( dry.humidity_alert );
  }

  #[test]
  fn disabled_alerts_never_sound() {
    let mut t = thresholds();
    t.alert = false;

    let verdict = evaluate(&CompensatedReading { temp : 30.0, humidity : 90.0 }, &t);
    assert!( verdict.has_alert );
    assert!( !verdict.should_sound );
  }

  #[test]
  fn compensation_is_linear_and_reversible() {
    let mut t = thresholds();
    t.temp_offset = 2.5;
    t.humidity_offset = -3.0;

    let raw = RawReading { temp : 4.2, humidity : 55.0 };
    let compensated = compensate(&raw, &t);

    assert_eq!( compensated.temp, 6.7 );
    assert_eq!( compensated.humidity, 52.0 );
    assert_eq!( compensated.temp - t.temp_offset, raw.temp );
    assert_eq!( compensated.humidity - t.humidity_offset, raw.humidity );
  }

  #[test]
  fn offset_decides_whether_a_reading_alarms() {
    // raw 24 with offset +2 reads 26 and alarms; with offset -2 it reads 22 and does not
    let mut t = thresholds();
    t.temp_offset = 2.0;

    let raw = RawReading { temp : 24.0, humidity : 50.0 };
    let verdict = evaluate(&compensate(&raw, &t), &t);
    assert!( verdict.temp_alert );

    t.temp_offset = -2.0;
    let verdict = evaluate(&compensate(&raw, &t), &t);
    assert!( !verdict.temp_alert );
    assert!( !verdict.has_alert );
  }
}
