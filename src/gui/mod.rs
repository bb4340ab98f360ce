use eframe::egui;
use crate::egui::*;
use crate::egui::widget_text::RichText;
use crate::egui::plot::{Plot, Line, Legend, PlotPoints};
use tokio::sync::mpsc::{channel, Sender, Receiver};
use tokio::sync::mpsc::error::TryRecvError;
use std::thread;
use std::sync::Arc;
use log;
use egui_extras::{TableBuilder, Column};

use crate::interface::*;
use crate::thresholds::{self, UnitThresholds, CompensatedReading};
use crate::alarm::AlertSoundManager;
use crate::alarm::scheduler::ThreadScheduler;
use crate::alarm::audio::RodioOutput;
use crate::worker::worker_thread;

pub mod texts;
use texts::{Texts, Language};

#[derive(Default)]
pub struct GUIState {
  show_settings : bool,
  settings_edit : Vec<UnitThresholds>,
  new_unit : UnitThresholds,
}

pub struct PharmacyDashboard {
  state : MonitorState,
  gui_state : GUIState,
  receiver : Receiver<MonitorState>,
  sender : Sender<MonitorCommand>,
  alarm : AlertSoundManager,
  texts : Texts,
}

impl PharmacyDashboard {
  pub fn new(cc : &eframe::CreationContext<'_>, cfg : DashboardConfig) -> Self {

    log::debug!("PharmacyDashboard created with IntegrationInfo {:?}", cc.integration_info);
    const MAX_NUM_MESSAGES : usize = 10;

    let (worker_sender, gui_receiver) = channel::<MonitorState>(MAX_NUM_MESSAGES);
    let (gui_sender, worker_receiver) = channel::<MonitorCommand>(MAX_NUM_MESSAGES);

    let ctx = cc.egui_ctx.clone();

    let mut style = (*ctx.style()).clone();
    style.visuals.selection.bg_fill = Color32::DARK_GREEN;
    ctx.set_style(style);

    let language = if cfg.language == "en" { Language::English } else { Language::Chinese };

    let alarm = AlertSoundManager::new( Arc::new( ThreadScheduler ), Arc::new( RodioOutput::new() ) );
    let worker_alarm = alarm.clone();

    // it detaches but we are control it via channels
    thread::spawn(move|| worker_thread(worker_sender, worker_receiver, ctx, cfg, worker_alarm));

    PharmacyDashboard {
     state : MonitorState::default(),
     gui_state : GUIState::default(),
     receiver : gui_receiver,
     sender : gui_sender,
     alarm,
     texts : Texts::new(language),
   }
  }

  fn send_command(&self, cmd : MonitorCommand) {
    if let Err( err ) = self.sender.try_send( cmd ) {
      log::error!("Failed to send {:?} command. Ignoring.", err);
    }
  }

  fn header_row(&mut self, ui : &mut Ui) {
    ui.horizontal(|ui| {
      ui.heading(self.texts.overview());

      let muted = self.alarm.get_mute_status();
      let mute_text = if muted {
            RichText::new(self.texts.unmute()).color(Color32::GRAY)
          } else if self.alarm.is_playing() {
            RichText::new(self.texts.mute()).color(Color32::RED)
          } else {
            RichText::new(self.texts.mute())
      };
      if ui.button(mute_text).clicked() {
        if muted {
          self.alarm.unmute();
        } else {
          self.alarm.mute();
        }
      }

      if ui.button(self.texts.settings()).clicked() {
        self.gui_state.show_settings = !self.gui_state.show_settings;
        if self.gui_state.show_settings {
          self.gui_state.settings_edit = self.state.settings.clone();
        }
      }

      if ui.button(self.texts.refresh()).clicked() {
        self.send_command( MonitorCommand::Refresh );
      }

      if let Some( last_refresh ) = &self.state.last_refresh {
        ui.label( format!("{}：{}", self.texts.last_updated(), last_refresh.format("%H:%M:%S")) );
      }
    });
  }

  fn unit_card(&self, ui : &mut Ui, unit : &UnitSnapshot) {
    let compensated = CompensatedReading { temp : unit.temp, humidity : unit.humidity };
    let verdict = thresholds::evaluate(&compensated, &unit.thresholds);

    // the sound is shared: the manager folds every alarming card into one loop
    if verdict.should_sound && !self.alarm.get_mute_status() {
      self.alarm.play_alert();
    }

    let border = if verdict.should_sound {
      Stroke::new(2.0, Color32::RED)
    } else {
      ui.visuals().widgets.noninteractive.bg_stroke
    };

    Frame::group(ui.style()).stroke(border).show(ui, |ui| {
      ui.vertical(|ui| {
        ui.horizontal(|ui| {
          ui.heading(&unit.name);
          if !unit.thresholds.alert {
            ui.label( RichText::new(self.texts.alerts_disabled()).small().color(Color32::GRAY) );
          }
        });

        if verdict.should_sound {
          ui.label( RichText::new(self.texts.out_of_range()).color(Color32::RED) );
        } else if verdict.has_alert {
          ui.label( RichText::new(self.texts.out_of_range_disabled()).color(Color32::YELLOW) );
        }

        ui.horizontal(|ui| {
          let temp_color = value_color(unit.temp,
            unit.thresholds.temp_min, unit.thresholds.temp_max,
            Color32::LIGHT_BLUE, Color32::RED);
          ui.label( RichText::new(format!("{} {:.1}°C", self.texts.temperature(), unit.temp))
            .heading().color(temp_color).size(28.0) );

          let humidity_color = value_color(unit.humidity,
            unit.thresholds.humidity_min, unit.thresholds.humidity_max,
            Color32::GOLD, Color32::LIGHT_BLUE);
          ui.label( RichText::new(format!("{} {:.1}%", self.texts.humidity(), unit.humidity))
            .heading().color(humidity_color).size(28.0) );
        });

        ui.label( RichText::new(format!("{}：{}", self.texts.last_updated(), unit.add_time)).small() );
      });
    });
  }

  fn trend_plots(&self, ui : &mut Ui) {
    ui.heading(self.texts.trend_chart());

    let mut names : Vec<&str> = Vec::new();
    for point in &self.state.history {
      if !names.contains(&point.name.as_str()) {
        names.push(&point.name);
      }
    }

    for name in names {
      ui.label( RichText::new(name).strong() );

      let temp_points : PlotPoints = self.state.history.iter()
        .filter(|point| point.name == name)
        .map(|point| [point.hour, point.temp])
        .collect();
      let humidity_points : PlotPoints = self.state.history.iter()
        .filter(|point| point.name == name)
        .map(|point| [point.hour, point.humidity])
        .collect();

      Plot::new(format!("trend-{}", name))
        .height(180.0)
        .include_x(0.0)
        .include_x(24.0)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
          plot_ui.line( Line::new(temp_points).name(self.texts.temperature()) );
          plot_ui.line( Line::new(humidity_points).name(self.texts.humidity()) );
        });
    }
  }

  fn settings_window(&mut self, ctx : &Context) {
    let mut open = self.gui_state.show_settings;
    let mut update_clicked = false;
    let mut add_clicked = false;
    let mut delete_guid : Option<String> = None;

    let texts = &self.texts;
    let settings = &mut self.gui_state.settings_edit;
    let new_unit = &mut self.gui_state.new_unit;

    Window::new(texts.settings()).open(&mut open).show(ctx, |ui| {
      TableBuilder::new(ui)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .header(24.0, |mut header| {
          header.col(|ui| { ui.label(texts.unit_name()); });
          header.col(|ui| { ui.label(format!("{} min", texts.temperature())); });
          header.col(|ui| { ui.label(format!("{} max", texts.temperature())); });
          header.col(|ui| { ui.label(format!("{} +/-", texts.temperature())); });
          header.col(|ui| { ui.label(format!("{} min", texts.humidity())); });
          header.col(|ui| { ui.label(format!("{} max", texts.humidity())); });
          header.col(|ui| { ui.label(format!("{} +/-", texts.humidity())); });
          header.col(|ui| { ui.label(texts.settings()); });
          header.col(|ui| { ui.label(""); });
        })
        .body(|body| {
          body.rows(28.0, settings.len(), |row_index, mut row| {
            let unit = &mut settings[row_index];
            row.col(|ui| { ui.text_edit_singleline(&mut unit.name); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.temp_min).speed(0.1) ); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.temp_max).speed(0.1) ); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.temp_offset).speed(0.1) ); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.humidity_min).speed(0.1) ); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.humidity_max).speed(0.1) ); });
            row.col(|ui| { ui.add( DragValue::new(&mut unit.humidity_offset).speed(0.1) ); });
            row.col(|ui| { ui.checkbox(&mut unit.alert, ""); });
            row.col(|ui| {
              if ui.button(texts.delete()).clicked() {
                delete_guid = Some( unit.guid.clone() );
              }
            });
          });
        });

      ui.separator();
      if ui.button(texts.update_settings()).clicked() {
        update_clicked = true;
      }

      ui.separator();
      ui.label( RichText::new(texts.add_unit()).strong() );
      ui.horizontal(|ui| {
        ui.label(texts.unit_name());
        ui.text_edit_singleline(&mut new_unit.name);
        ui.label(format!("{} min/max", texts.temperature()));
        ui.add( DragValue::new(&mut new_unit.temp_min).speed(0.1) );
        ui.add( DragValue::new(&mut new_unit.temp_max).speed(0.1) );
        ui.label(format!("{} min/max", texts.humidity()));
        ui.add( DragValue::new(&mut new_unit.humidity_min).speed(0.1) );
        ui.add( DragValue::new(&mut new_unit.humidity_max).speed(0.1) );
        if ui.button(texts.add_unit()).clicked() {
          add_clicked = true;
        }
      });
    });

    self.gui_state.show_settings = open;

    if update_clicked {
      self.send_command( MonitorCommand::UpdateSettings( self.gui_state.settings_edit.clone() ) );
    }
    if add_clicked {
      let unit = std::mem::take(&mut self.gui_state.new_unit);
      self.send_command( MonitorCommand::AddSetting( unit ) );
    }
    if let Some( guid ) = delete_guid {
      self.gui_state.settings_edit.retain(|unit| unit.guid != guid);
      self.send_command( MonitorCommand::DeleteSetting( guid ) );
    }
  }

}

impl eframe::App for PharmacyDashboard {
  fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {

    //only last message from channel is actual
    let mut new_state : Option<MonitorState> = None;
    loop {
      match self.receiver.try_recv() {
        Ok( state ) => {
            new_state = Some( state );
         },
        Err( TryRecvError::Disconnected ) => {
          log::error!("Worker thread is dead. Closing...");
          frame.close();
          break;
        },
        _ => break,
      }
    }

    if let Some( new_state ) = new_state {
      log::debug!("recv: {} units, {} history points", new_state.units.len(), new_state.history.len());
      // keep the open settings panel editable, refresh it once it is closed
      if !self.gui_state.show_settings {
        self.gui_state.settings_edit = new_state.settings.clone();
      }
      self.state = new_state;
    }

    egui::CentralPanel::default().show(ctx, |ui| {
      ScrollArea::vertical().show(ui, |ui| {
        self.header_row(ui);

        if let Some( error ) = &self.state.error {
          ui.label( RichText::new(format!("{}: {}", self.texts.load_error(), error)).color(Color32::RED) );
        }

        if self.state.units.is_empty() {
          ui.label(self.texts.no_data());
        } else {
          ui.horizontal_wrapped(|ui| {
            for unit in &self.state.units {
              self.unit_card(ui, unit);
            }
          });
        }

        ui.separator();
        self.trend_plots(ui);
      });

      if ui.ctx().input( |i| i.key_pressed(Key::Q) )   {
        frame.close();
      }
    });

    if self.gui_state.show_settings {
      self.settings_window(ctx);
    }
  }

}

fn value_color(value : f64, min : f64, max : f64, below : Color32, above : Color32) -> Color32 {
    if value < min { return below; }
    if value > max { return above; }
    Color32::GREEN
}
