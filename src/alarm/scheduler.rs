use std::sync::{Arc, Mutex, Condvar};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use std::thread;

pub type OnceCallback = Box<dyn FnOnce() + Send + 'static>;
// a repeating callback returns false to stop its own timer
pub type RepeatCallback = Box<dyn FnMut() -> bool + Send + 'static>;

pub trait AlarmScheduler : Send + Sync {
  fn schedule_once(&self, delay : Duration, callback : OnceCallback) -> TimerHandle;
  fn schedule_repeating(&self, interval : Duration, callback : RepeatCallback) -> TimerHandle;
}

struct TimerFlags {
  cancelled : AtomicBool,
  gate : Mutex<bool>,
  wakeup : Condvar,
}

#[derive(Clone)]
pub struct TimerHandle {
  flags : Arc<TimerFlags>,
}

impl TimerHandle {
  fn new() -> TimerHandle {
    TimerHandle {
      flags : Arc::new( TimerFlags {
        cancelled : AtomicBool::new(false),
        gate : Mutex::new(false),
        wakeup : Condvar::new(),
      }),
    }
  }

  // cancel never blocks and never joins the timer thread, so it is safe to
  // call while the callback is waiting on some other lock
  pub fn cancel(&self) {
    self.flags.cancelled.store(true, Ordering::SeqCst);
    let mut gate = self.flags.gate.lock().unwrap();
    *gate = true;
    self.flags.wakeup.notify_all();
  }

  pub fn is_cancelled(&self) -> bool {
    self.flags.cancelled.load(Ordering::SeqCst)
  }

  fn wait(&self, timeout : Duration) {
    let gate = self.flags.gate.lock().unwrap();
    let _unused = self.flags.wakeup.wait_timeout_while(gate, timeout, |woken| !*woken).unwrap();
  }
}

pub struct ThreadScheduler;

impl AlarmScheduler for ThreadScheduler {
  fn schedule_once(&self, delay : Duration, callback : OnceCallback) -> TimerHandle {
    let handle = TimerHandle::new();

    let timer_handle = handle.clone();
    thread::spawn(move || {
      timer_handle.wait(delay);
      if !timer_handle.is_cancelled() {
        callback();
      }
    });

    handle
  }

  fn schedule_repeating(&self, interval : Duration, mut callback : RepeatCallback) -> TimerHandle {
    let handle = TimerHandle::new();

    let timer_handle = handle.clone();
    thread::spawn(move || {
      loop {
        timer_handle.wait(interval);
        if timer_handle.is_cancelled() {
          break;
        }
        if !callback() {
          break;
        }
      }
    });

    handle
  }
}

#[cfg(test)]
pub mod testing {
  use super::*;

  enum VirtualCallback {
    Once( OnceCallback ),
    Repeating { interval : Duration, callback : RepeatCallback },
  }

  struct VirtualTimer {
    due : Duration,
    seq : u64,
    handle : TimerHandle,
    callback : VirtualCallback,
  }

  struct VirtualQueue {
    now : Duration,
    next_seq : u64,
    timers : Vec<VirtualTimer>,
  }

  // deterministic clock for tests: timers fire inside advance(), in deadline
  // order, ties broken by registration order (a repeating timer keeps its
  // original registration slot across ticks)
  pub struct VirtualScheduler {
    queue : Mutex<VirtualQueue>,
  }

  impl VirtualScheduler {
    pub fn new() -> VirtualScheduler {
      VirtualScheduler {
        queue : Mutex::new( VirtualQueue { now : Duration::ZERO, next_seq : 0, timers : Vec::new() } ),
      }
    }

    pub fn advance(&self, step : Duration) {
      let target = self.queue.lock().unwrap().now + step;

      loop {
        // pick the next due timer while holding the lock, run it after
        // releasing it - callbacks re-enter the scheduler
        let next = {
          let mut queue = self.queue.lock().unwrap();
          queue.timers.retain(|timer| !timer.handle.is_cancelled());

          let idx = queue.timers.iter().enumerate()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(idx, _)| idx);

          match idx {
            None => {
              queue.now = target;
              None
            },
            Some( idx ) => {
              let timer = queue.timers.remove(idx);
              queue.now = timer.due;
              Some( timer )
            },
          }
        };

        let timer = match next {
          None => break,
          Some( timer ) => timer,
        };

        match timer.callback {
          VirtualCallback::Once( callback ) => callback(),
          VirtualCallback::Repeating { interval, mut callback } => {
            let keep_going = callback();
            if keep_going && !timer.handle.is_cancelled() {
              let mut queue = self.queue.lock().unwrap();
              queue.timers.push( VirtualTimer {
                due : timer.due + interval,
                seq : timer.seq,
                handle : timer.handle,
                callback : VirtualCallback::Repeating { interval, callback },
              });
            }
          },
        }
      }
    }

    fn insert(&self, delay : Duration, handle : &TimerHandle, callback : VirtualCallback) {
      let mut queue = self.queue.lock().unwrap();
      let due = queue.now + delay;
      let seq = queue.next_seq;
      queue.next_seq += 1;
      queue.timers.push( VirtualTimer { due, seq, handle : handle.clone(), callback } );
    }
  }

  impl AlarmScheduler for VirtualScheduler {
    fn schedule_once(&self, delay : Duration, callback : OnceCallback) -> TimerHandle {
      let handle = TimerHandle::new();
      self.insert(delay, &handle, VirtualCallback::Once( callback ));
      handle
    }

    fn schedule_repeating(&self, interval : Duration, callback : RepeatCallback) -> TimerHandle {
      let handle = TimerHandle::new();
      self.insert(interval, &handle, VirtualCallback::Repeating { interval, callback });
      handle
    }
  }
}
