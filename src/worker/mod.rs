use crate::egui::Context; // b/c of re-export
use tokio::sync::mpsc::{Sender, Receiver};
use tokio::sync::mpsc::error::TrySendError;
use tokio;
use log;
use chrono::Local;
use std::time::Duration;

use crate::interface::*;
use crate::thresholds::UnitThresholds;
use crate::alarm::AlertSoundManager;

pub mod backend;

#[tokio::main]
pub async fn worker_thread(
  sender : Sender<MonitorState>,
  receiver : Receiver<MonitorCommand>,
  ctx : Context,
  cfg : DashboardConfig,
  alarm : AlertSoundManager)
{
  let result = worker_thread_prime(sender, receiver, ctx, cfg, alarm).await;
  if let Err( e ) = result {
    log::error!("Error in worker_thread : {}. exiting....", e);
  }
}

pub async fn worker_thread_prime(
  sender : Sender<MonitorState>,
  mut receiver : Receiver<MonitorCommand>,
  ctx : Context,
  cfg : DashboardConfig,
  alarm : AlertSoundManager) -> Result<(), String>
{
  let client = reqwest::Client::builder()
    .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)))
    .build()
    .map_err(|e| e.to_string())?;

  let poll_interval = Duration::from_secs(cfg.poll_interval_secs.max(1));
  let mut state = MonitorState::default();

  loop {
    refresh_state(&client, &cfg.api_base_url, &alarm, &mut state).await;

    match sender.try_send(state.clone()) {
      Ok(()) => ctx.request_repaint(),
      Err( TrySendError::Full( _ ) ) => log::warn!("Failed to send monitor state, GUI is not consuming it!"),
      Err( TrySendError::Closed( _ ) ) => {
        log::warn!("Failed to send monitor state - channel is closed. Probably GUI is dead, exiting....");
        return Ok(());
      },
    }

    tokio::select! {
      _ = tokio::time::sleep(poll_interval) => {},
      cmd = receiver.recv() => match cmd {
        None => {
          log::warn!("Command channel is closed, probably GUI is dead. Exiting...");
          return Ok(());
        },
        Some( cmd ) => execute_command(&client, &cfg.api_base_url, cmd).await,
      },
    }
  }
}

async fn refresh_state(
  client : &reqwest::Client,
  base_url : &str,
  alarm : &AlertSoundManager,
  state : &mut MonitorState)
{
  // a mute only lasts until the next data load; a fresh episode alarms again
  alarm.reset_mute_status();

  let (latest, history, settings) = futures::join!(
    backend::get_latest_today(client, base_url),
    backend::get_today_history(client, base_url),
    backend::get_settings(client, base_url),
  );

  match latest {
    Ok( units ) => {
      log::debug!("Loaded {} unit snapshots", units.len());
      state.units = units;
      state.error = None;
    },
    Err( e ) => {
      log::error!("Error loading latest readings : {}", e);
      state.error = Some( e );
    },
  }

  match history {
    // a broken chart must not take the overview down with it
    Ok( points ) => state.history = points,
    Err( e ) => log::warn!("Error loading today history : {}", e),
  }

  match settings {
    Ok( settings ) => state.settings = settings,
    Err( e ) => {
      log::warn!("Failed to load thresholds, using defaults : {}", e);
      state.settings = vec![ UnitThresholds::default() ];
    },
  }

  state.last_refresh = Some( Local::now() );
}

async fn execute_command(client : &reqwest::Client, base_url : &str, cmd : MonitorCommand)
{
  log::debug!("Got CMD: {:?}", cmd);
  match cmd {
    MonitorCommand::Refresh => (),
    MonitorCommand::UpdateSettings( settings ) => {
      if let Err( e ) = backend::update_settings(client, base_url, &settings).await {
        log::warn!("Failed to update unit settings : {}", e);
      }
    },
    MonitorCommand::AddSetting( setting ) => {
      if let Err( e ) = backend::add_setting(client, base_url, &setting).await {
        log::warn!("Failed to add unit {} : {}", setting.name, e);
      }
    },
    MonitorCommand::DeleteSetting( guid ) => {
      if let Err( e ) = backend::delete_setting(client, base_url, &guid).await {
        log::warn!("Failed to delete unit {} : {}", guid, e);
      }
    },
  };
}
