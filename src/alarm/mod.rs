use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::option::Option;

pub mod scheduler;
pub mod audio;

use scheduler::{AlarmScheduler, TimerHandle};
use audio::AlarmOutput;

const REPEAT_INTERVAL : Duration = Duration::from_secs(2);
const AUTO_STOP_AFTER : Duration = Duration::from_secs(60);

#[derive(Default)]
struct AlarmFlags {
  muted : bool,
  playing : bool,
  repeat_timer : Option<TimerHandle>,
  auto_stop_timer : Option<TimerHandle>,
}

// One shared alarm stream for the whole process. Any number of unit cards may
// ask for sound, the `playing` guard collapses them into a single loop, and a
// mute silences all of them at once. Clones share the same state.
#[derive(Clone)]
pub struct AlertSoundManager {
  flags : Arc<Mutex<AlarmFlags>>,
  scheduler : Arc<dyn AlarmScheduler>,
  output : Arc<dyn AlarmOutput>,
}

impl AlertSoundManager {
  pub fn new(scheduler : Arc<dyn AlarmScheduler>, output : Arc<dyn AlarmOutput>) -> AlertSoundManager {
    AlertSoundManager {
      flags : Arc::new( Mutex::new( AlarmFlags::default() ) ),
      scheduler,
      output,
    }
  }

  // Idempotent: a no-op while muted or while the loop is already running.
  // Starts the repeating tri-tone loop and arms the 60 second auto-stop.
  pub fn play_alert(&self) {
    let mut flags = self.flags.lock().unwrap();
    if flags.muted || flags.playing {
      return;
    }

    // the first sequence doubles as the availability probe; if the speaker is
    // not there the alarm stays visual-only
    if let Err( e ) = self.output.play_sequence() {
      log::warn!("Alert sound is unavailable : {}", e);
      return;
    }

    flags.playing = true;

    let tick_manager = self.clone();
    flags.repeat_timer = Some( self.scheduler.schedule_repeating(REPEAT_INTERVAL,
      Box::new(move || tick_manager.alarm_tick())) );

    let stop_manager = self.clone();
    flags.auto_stop_timer = Some( self.scheduler.schedule_once(AUTO_STOP_AFTER,
      Box::new(move || stop_manager.auto_stop())) );
  }

  pub fn mute(&self) {
    let mut flags = self.flags.lock().unwrap();
    flags.muted = true;
    stop_alarm(&mut flags);
  }

  // does not resume sound; the next play_alert restarts it if the readings
  // are still out of range
  pub fn unmute(&self) {
    self.flags.lock().unwrap().muted = false;
  }

  // called at the start of every data refresh, so a mute from a previous
  // alarm episode does not swallow a new one
  pub fn reset_mute_status(&self) {
    self.flags.lock().unwrap().muted = false;
  }

  pub fn get_mute_status(&self) -> bool {
    self.flags.lock().unwrap().muted
  }

  pub fn is_playing(&self) -> bool {
    self.flags.lock().unwrap().playing
  }

  fn alarm_tick(&self) -> bool {
    {
      let mut flags = self.flags.lock().unwrap();
      if flags.muted {
        stop_alarm(&mut flags);
        return false;
      }
    }

    // the lock is not held while the sequence is queued
    if let Err( e ) = self.output.play_sequence() {
      log::warn!("Lost audio output mid-alarm : {}", e);
    }
    true
  }

  fn auto_stop(&self) {
    log::info!("Auto-stopping alarm after {} seconds", AUTO_STOP_AFTER.as_secs());
    let mut flags = self.flags.lock().unwrap();
    stop_alarm(&mut flags);
    // auto-mute, otherwise the still-alarming cards would restart the sound
    // on the very next frame
    flags.muted = true;
  }
}

fn stop_alarm(flags : &mut AlarmFlags) {
  if let Some( timer ) = flags.repeat_timer.take() {
    timer.cancel();
  }
  if let Some( timer ) = flags.auto_stop_timer.take() {
    timer.cancel();
  }
  flags.playing = false;
}
