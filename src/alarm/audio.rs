use std::sync::Mutex;
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;

use rodio::{OutputStream, Sink};
use rodio::source::{SineWave, Source, Zero};

pub trait AlarmOutput : Send + Sync {
  fn play_sequence(&self) -> Result<(), String>;
}

enum AudioCommand {
  Sequence,
}

// Owns the speaker through a dedicated thread; the thread is started lazily
// on the first sequence request and keeps the output stream for the rest of
// the process lifetime. A failed startup is cached, so every later call
// degrades with the same error instead of re-probing the device.
pub struct RodioOutput {
  worker : Mutex<Option<Result<SyncSender<AudioCommand>, String>>>,
}

impl RodioOutput {
  pub fn new() -> RodioOutput {
    RodioOutput { worker : Mutex::new( None ) }
  }
}

impl AlarmOutput for RodioOutput {
  fn play_sequence(&self) -> Result<(), String> {
    let mut worker = self.worker.lock().unwrap();

    if worker.is_none() {
      *worker = Some( start_audio_thread() );
    }

    match worker.as_ref().unwrap() {
      Err( e ) => Err( e.clone() ),
      Ok( sender ) => match sender.try_send( AudioCommand::Sequence ) {
        Ok(()) => Ok(()),
        // the sink is still draining earlier sequences, skipping one is fine
        Err( TrySendError::Full( _ ) ) => Ok(()),
        Err( TrySendError::Disconnected( _ ) ) => Err( String::from("audio thread is gone") ),
      },
    }
  }
}

fn start_audio_thread() -> Result<SyncSender<AudioCommand>, String> {
  let (sender, receiver) = sync_channel::<AudioCommand>(4);
  let (ready_sender, ready_receiver) = sync_channel::<Result<(), String>>(1);

  thread::spawn(move || {
    // OutputStream is not Send, it has to live and die on this thread
    let (_stream, stream_handle) = match OutputStream::try_default() {
      Err( e ) => {
        let _ = ready_sender.send( Err( format!("Failed to open audio output : {}", e) ) );
        return;
      },
      Ok( stream ) => stream,
    };

    let sink = match Sink::try_new(&stream_handle) {
      Err( e ) => {
        let _ = ready_sender.send( Err( format!("Failed to create audio sink : {}", e) ) );
        return;
      },
      Ok( sink ) => sink,
    };

    if ready_sender.send( Ok(()) ).is_err() {
      return;
    }

    loop {
      match receiver.recv() {
        Ok( AudioCommand::Sequence ) => queue_alarm_sequence(&sink),
        Err( _ ) => {
          log::debug!("All audio senders dropped, stopping audio thread");
          break;
        },
      }
    }
  });

  match ready_receiver.recv() {
    Ok( Ok(()) ) => Ok( sender ),
    Ok( Err( e ) ) => Err( e ),
    Err( e ) => Err( format!("Audio thread died during startup : {}", e) ),
  }
}

// tri-tone alarm: 800 Hz, 1000 Hz, 800 Hz, 200 ms each with 100 ms gaps
fn queue_alarm_sequence(sink : &Sink) {
  sink.append( beep(800.0) );
  sink.append( gap() );
  sink.append( beep(1000.0) );
  sink.append( gap() );
  sink.append( beep(800.0) );
}

fn beep(frequency : f32) -> impl Source<Item = f32> + Send {
  SineWave::new(frequency)
    .take_duration(Duration::from_millis(200))
    .amplify(0.3)
}

fn gap() -> impl Source<Item = f32> + Send {
  Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(100))
}
