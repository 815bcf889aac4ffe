use crate::bulk::BulkOp;
use crate::model::{ConnectionField, SendMode};
use crate::project::{FixedValue, ParameterRecord, records_markdown};
use crate::resolve::{self, FlagKind, FlagValue, Slot};
use crate::session::{EditEvent, LoadedConfig, Refresh};
use crate::statics;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

pub fn run_gui(initial: Option<PathBuf>) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    let title = format!("{} {}", statics::EN_APP_TITLE, env!("CARGO_PKG_VERSION"));
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| {
            let mut app = EditorApp {
                theme_dark: true,
                ..Default::default()
            };
            if let Some(path) = initial {
                app.load(&path);
            }
            Ok(Box::new(app))
        }),
    )
}

/// Application state: the loaded session, the projected rows it renders, and the text buffers
/// of fields that are committed on focus loss.
#[derive(Default)]
struct EditorApp {
    config: Option<LoadedConfig>,
    records: Vec<ParameterRecord>,
    dialog_dir: Option<PathBuf>,
    connection_buffers: HashMap<ConnectionField, String>,
    numeric_buffers: HashMap<(Slot, FlagKind), String>,
    bulk_send_mode: SendMode,
    status: String,
    last_error: Option<String>,
    theme_dark: bool,
}

impl EditorApp {
    fn file_dialog(&self) -> rfd::FileDialog {
        let mut dlg = rfd::FileDialog::new().add_filter(statics::EN_FILTER_CONFIG, &["json"]);
        if let Some(dir) = self.dialog_dir.clone() {
            dlg = dlg.set_directory(dir);
        }
        dlg
    }

    fn load(&mut self, path: &Path) {
        match LoadedConfig::load_path(path) {
            Ok(config) => {
                self.dialog_dir = path.parent().map(PathBuf::from);
                self.status = format!("Loaded {}", path.display());
                self.last_error = config
                    .rewrites_layout()
                    .then(|| statics::EN_WARN_REFORMAT.to_string());
                self.set_config(config);
            }
            Err(e) => {
                log::error!("failed to load {path:?}: {e:#}");
                self.last_error = Some(format!("Failed to load: {e:#}"));
            }
        }
    }

    fn set_config(&mut self, config: LoadedConfig) {
        self.records = config.records();
        self.connection_buffers = ConnectionField::ALL
            .into_iter()
            .map(|field| (field, config.document.connection.text(field)))
            .collect();
        self.numeric_buffers.clear();
        self.config = Some(config);
    }

    fn open_file(&mut self) {
        if let Some(path) = self.file_dialog().pick_file() {
            self.load(&path);
        }
    }

    fn save_file(&mut self) {
        let Some(config) = self.config.as_mut() else {
            return;
        };
        if config.source_path.is_none() {
            self.save_file_as();
            return;
        }
        match config.save() {
            Ok(()) => {
                self.status = statics::EN_STATUS_SAVED.to_string();
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(format!("Failed to save: {e:#}")),
        }
    }

    fn save_file_as(&mut self) {
        let mut dlg = self.file_dialog();
        if let Some(config) = self.config.as_ref()
            && let Some(source_path) = config.source_path.as_ref()
            && let Some(file_name) = source_path.file_name()
        {
            dlg = dlg.set_file_name(file_name.to_string_lossy());
        }

        let Some(path) = dlg.save_file() else {
            return;
        };
        let Some(config) = self.config.as_mut() else {
            return;
        };

        if let Err(e) = config.save_to_path(&path) {
            self.last_error = Some(format!("Failed to save: {e:#}"));
        } else {
            self.dialog_dir = path.parent().map(PathBuf::from);
            self.status = format!("Saved {}", path.display());
            self.last_error = None;
        }
    }

    /// Feeds queued edits to the session and refreshes exactly what each one reports.
    fn apply_events(&mut self, events: Vec<EditEvent>) {
        let Some(config) = self.config.as_mut() else {
            return;
        };
        for event in events {
            match config.handle(event) {
                Ok(Refresh::Row(slot)) => {
                    self.numeric_buffers.retain(|(s, _), _| *s != slot);
                    if let Some(fresh) = config.records().into_iter().find(|r| r.slot == slot)
                        && let Some(row) = self.records.iter_mut().find(|r| r.slot == slot)
                    {
                        *row = fresh;
                    }
                    self.last_error = None;
                }
                Ok(Refresh::Connection { field, text }) => {
                    self.connection_buffers.insert(field, text);
                    self.last_error = None;
                }
                Ok(Refresh::All) => {
                    self.records = config.records();
                    self.numeric_buffers.clear();
                    self.last_error = None;
                }
                Err(e) => {
                    // Buffers re-read the unchanged document.
                    self.numeric_buffers.clear();
                    self.last_error = Some(e.to_string());
                }
            }
        }
    }

    fn render_connection(&mut self, ui: &mut egui::Ui, events: &mut Vec<EditEvent>) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let connection = &config.document.connection;

        ui.heading(statics::EN_HEADING_CONNECTION);
        egui::Grid::new("connection_grid")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for field in ConnectionField::ALL {
                    let committed = connection.text(field);
                    let optional_absent =
                        field != ConnectionField::Host && connection.integer(field).is_none();
                    ui.label(field.label());
                    let buffer = self
                        .connection_buffers
                        .entry(field)
                        .or_insert_with(|| committed.clone());
                    let response = ui.add(
                        egui::TextEdit::singleline(buffer)
                            .desired_width(140.0)
                            .hint_text(if optional_absent {
                                statics::EN_HINT_UNSET
                            } else {
                                statics::EN_EMPTY
                            }),
                    );
                    if response.changed() && field != ConnectionField::Host {
                        *buffer = resolve::clean_integer_text(buffer);
                    }
                    if response.lost_focus() && *buffer != committed {
                        events.push(EditEvent::Connection {
                            field,
                            text: buffer.clone(),
                        });
                    }
                    ui.end_row();
                }
            });

        if !config.document.default_bindings.is_empty() {
            ui.separator();
            ui.heading(statics::EN_HEADING_BINDINGS);
            for binding in &config.document.default_bindings {
                ui.label(&binding.controller_type)
                    .on_hover_text(&binding.binding_url);
            }
        }
    }

    fn render_bulk(&mut self, ui: &mut egui::Ui, events: &mut Vec<EditEvent>) {
        ui.heading(statics::EN_HEADING_BULK);
        for op in BulkOp::BUTTONS {
            if ui.button(op.label()).clicked() {
                events.push(EditEvent::Bulk(op));
            }
        }
        ui.horizontal(|ui| {
            ui.label(statics::EN_LABEL_SEND_MODE_ALL);
            egui::ComboBox::from_id_salt("bulk_send_mode")
                .selected_text(self.bulk_send_mode.label())
                .show_ui(ui, |ui| {
                    for mode in SendMode::ALL {
                        if ui
                            .selectable_label(self.bulk_send_mode == mode, mode.label())
                            .clicked()
                        {
                            self.bulk_send_mode = mode;
                            events.push(EditEvent::Bulk(BulkOp::SetSendMode(mode)));
                        }
                    }
                });
        });
    }

    fn render_parameters(&mut self, ui: &mut egui::Ui, events: &mut Vec<EditEvent>) {
        let records = &self.records;
        let buffers = &mut self.numeric_buffers;
        let row_h = ui.text_style_height(&egui::TextStyle::Body) + 8.0;

        ui.heading(statics::EN_HEADING_PARAMETERS);
        ui.push_id("parameters_table", |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::initial(220.0).resizable(true))
                .column(Column::initial(70.0))
                .column(Column::initial(70.0))
                .column(Column::initial(40.0))
                .column(Column::initial(110.0))
                .column(Column::initial(70.0))
                .column(Column::initial(60.0))
                .column(Column::initial(150.0))
                .column(Column::remainder())
                .header(row_h, |mut header| {
                    for title in [
                        statics::EN_COL_NAME,
                        statics::EN_COL_SOURCE,
                        statics::EN_COL_TYPE,
                        statics::EN_COL_ENABLED,
                        statics::EN_COL_SEND_MODE,
                        statics::EN_COL_UNSIGNED,
                        statics::EN_COL_BINARY,
                        statics::EN_COL_FIXED,
                        statics::EN_COL_FLOATING,
                    ] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_h, records.len(), |mut row| {
                        let index = row.index();
                        let record = &records[index];

                        row.col(|ui| {
                            ui.monospace(&record.name);
                        });
                        row.col(|ui| {
                            ui.label(record.provenance.label());
                        });
                        row.col(|ui| {
                            ui.label(record.display_type.label());
                        });
                        row.col(|ui| {
                            flag_checkbox(ui, record, FlagKind::Enabled, events);
                        });
                        row.col(|ui| {
                            egui::ComboBox::from_id_salt(("send_mode", index))
                                .selected_text(record.send_mode.label())
                                .show_ui(ui, |ui| {
                                    for mode in SendMode::ALL {
                                        let selected = record.send_mode == mode;
                                        if ui.selectable_label(selected, mode.label()).clicked()
                                            && !selected
                                        {
                                            events.push(EditEvent::Field {
                                                name: record.name.clone(),
                                                flag: FlagKind::AlwaysSend,
                                                value: FlagValue::SendMode(mode),
                                            });
                                        }
                                    }
                                });
                        });
                        row.col(|ui| {
                            flag_checkbox(ui, record, FlagKind::Unsigned, events);
                        });
                        row.col(|ui| {
                            flag_checkbox(ui, record, FlagKind::BinaryEncoded, events);
                        });
                        row.col(|ui| match (record.fixed_value, record.annotation) {
                            (FixedValue::Derived, Some(note)) => {
                                ui.weak(note);
                            }
                            _ => numeric_cell(ui, buffers, record, FlagKind::FixedValue, events),
                        });
                        row.col(|ui| {
                            numeric_cell(ui, buffers, record, FlagKind::Floating, events);
                        });
                    });
                });
        });
    }
}

fn flag_checkbox(
    ui: &mut egui::Ui,
    record: &ParameterRecord,
    flag: FlagKind,
    events: &mut Vec<EditEvent>,
) {
    if !record.supports(flag) {
        return;
    }
    let Some(FlagValue::Bool(mut checked)) = record.flag(flag) else {
        return;
    };
    if ui.checkbox(&mut checked, statics::EN_EMPTY).changed() {
        events.push(EditEvent::Field {
            name: record.name.clone(),
            flag,
            value: FlagValue::Bool(checked),
        });
    }
}

fn numeric_cell(
    ui: &mut egui::Ui,
    buffers: &mut HashMap<(Slot, FlagKind), String>,
    record: &ParameterRecord,
    flag: FlagKind,
    events: &mut Vec<EditEvent>,
) {
    if !record.supports(flag) {
        return;
    }
    let committed = format_flag_number(record.flag(flag));
    let buffer = buffers
        .entry((record.slot, flag))
        .or_insert_with(|| committed.clone());
    let response = ui.add(egui::TextEdit::singleline(buffer).desired_width(70.0));
    if response.changed() {
        *buffer = resolve::clean_decimal_text(buffer);
    }
    if response.lost_focus() && *buffer != committed {
        events.push(EditEvent::NumericText {
            name: record.name.clone(),
            flag,
            text: buffer.clone(),
        });
    }
}

fn format_flag_number(value: Option<FlagValue>) -> String {
    match value {
        Some(FlagValue::Number(v)) => v.to_string(),
        _ => String::new(),
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut do_save = false;
        ctx.input_mut(|i| {
            if i.consume_key(egui::Modifiers::CTRL, egui::Key::S) {
                do_save = true;
            }
        });
        if do_save && self.config.is_some() {
            self.save_file();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                if ui.button(statics::EN_BTN_OPEN).clicked() {
                    self.open_file();
                }

                let has_config = self.config.is_some();
                if ui
                    .add_enabled(has_config, egui::Button::new(statics::EN_BTN_SAVE))
                    .clicked()
                {
                    self.save_file();
                }
                if ui
                    .add_enabled(has_config, egui::Button::new(statics::EN_BTN_SAVE_AS))
                    .clicked()
                {
                    self.save_file_as();
                }
                if ui
                    .add_enabled(has_config, egui::Button::new(statics::EN_BTN_COPY_MARKDOWN))
                    .clicked()
                {
                    ctx.copy_text(records_markdown(&self.records));
                    self.status = statics::EN_STATUS_COPIED.to_string();
                }

                if ui.button(statics::EN_BTN_TOGGLE_THEME).clicked() {
                    self.theme_dark = !self.theme_dark;
                    if self.theme_dark {
                        ctx.set_visuals(egui::Visuals::dark());
                    } else {
                        ctx.set_visuals(egui::Visuals::light());
                    }
                }

                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        if let Some(err) = self.last_error.clone() {
            egui::TopBottomPanel::top("error_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, err);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button(statics::EN_BTN_DISMISS).clicked() {
                            self.last_error = None;
                        }
                    });
                });
            });
        }

        let Some(config) = self.config.as_ref() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading(statics::EN_HOME_INSTRUCTIONS);
            });
            return;
        };

        let file_label = config
            .source_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| statics::EN_PLACEHOLDER_UNSAVED.to_string());
        let dirty = config.dirty;
        let reformat = config.rewrites_layout();

        // Shown before the side panel so it spans the full window width.
        egui::TopBottomPanel::bottom("bottom_status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(file_label);
                ui.separator();
                ui.label(format!(
                    "{} {}",
                    statics::EN_LABEL_RECORD_COUNT,
                    self.records.len()
                ));
                if dirty {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, statics::EN_BADGE_MODIFIED);
                }
                if reformat {
                    ui.separator();
                    ui.weak(statics::EN_BADGE_REFORMAT);
                }
            });
        });

        let mut events = Vec::new();

        egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_connection(ui, &mut events);
                    ui.separator();
                    self.render_bulk(ui, &mut events);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_parameters(ui, &mut events);
        });

        if !events.is_empty() {
            self.apply_events(events);
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorApp, format_flag_number};
    use crate::model::{ConnectionField, SendMode};
    use crate::resolve::{FlagKind, FlagValue};
    use crate::session::{EditEvent, LoadedConfig};
    use crate::statics;

    const CONFIG: &str = r#"{
  "IP": "127.0.0.1",
  "Port": 9000,
  "PollingRate": 60,
  "StickMoveTolerance": 5,
  "actions": [
    {
      "type": "vector1",
      "osc_parameter": "LeftTrigger",
      "enabled": true
    },
    {
      "type": "boolean",
      "osc_parameter": "LeftA",
      "enabled": true
    }
  ]
}"#;

    fn app() -> EditorApp {
        let mut app = EditorApp::default();
        app.set_config(LoadedConfig::from_bytes(CONFIG.as_bytes().to_vec()).unwrap());
        app
    }

    #[test]
    fn numbers_format_without_trailing_zeroes() {
        assert_eq!(format_flag_number(Some(FlagValue::Number(0.5))), "0.5");
        assert_eq!(format_flag_number(Some(FlagValue::Number(-1.0))), "-1");
        assert_eq!(format_flag_number(None), "");
    }

    #[test]
    fn row_edits_refresh_only_their_record() {
        let mut app = app();
        app.apply_events(vec![EditEvent::Field {
            name: "LeftA".to_string(),
            flag: FlagKind::AlwaysSend,
            value: FlagValue::SendMode(SendMode::WhileActive),
        }]);
        assert_eq!(app.records[1].send_mode, SendMode::WhileActive);
        assert_eq!(app.records[0].send_mode, SendMode::OnChange);
        assert!(app.last_error.is_none());
        assert!(app.config.as_ref().unwrap().dirty);
    }

    #[test]
    fn rejected_edits_surface_an_error() {
        let mut app = app();
        app.apply_events(vec![EditEvent::NumericText {
            name: "LeftTrigger".to_string(),
            flag: FlagKind::FixedValue,
            text: "-100".to_string(),
        }]);
        assert!(app.last_error.is_some());
        assert!(!app.config.as_ref().unwrap().dirty);
    }

    #[test]
    fn loading_a_commented_file_warns_about_reformatting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = EditorApp::default();

        std::fs::write(&path, format!("// hand edited\n{CONFIG}")).unwrap();
        app.load(&path);
        assert!(app.config.is_some());
        assert_eq!(app.last_error.as_deref(), Some(statics::EN_WARN_REFORMAT));

        std::fs::write(&path, CONFIG).unwrap();
        app.load(&path);
        assert!(app.last_error.is_none());
    }

    #[test]
    fn connection_buffers_take_the_cleaned_text() {
        let mut app = app();
        app.apply_events(vec![EditEvent::Connection {
            field: ConnectionField::PollingRate,
            text: "12O".to_string(),
        }]);
        assert_eq!(app.connection_buffers[&ConnectionField::PollingRate], "12");
    }
}
