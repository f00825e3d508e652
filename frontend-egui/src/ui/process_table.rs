//! Process table component with sorting and signalling.

use crate::ui::status_bar::LastAction;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use proctable::{send_signal, ProcessInfo, Scanner, Signal};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::info;

// Filter processes based on search text
fn filter_processes(processes: &[ProcessInfo], search_text: &str, exact: bool) -> Vec<ProcessInfo> {
    if search_text.is_empty() {
        return processes.to_vec();
    }
    if exact {
        return processes
            .iter()
            .filter(|p| p.name == search_text)
            .cloned()
            .collect();
    }

    let search_lower = search_text.to_lowercase();
    processes
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&search_lower)
                || p.pid.to_string().contains(&search_lower)
        })
        .cloned()
        .collect()
}

#[derive(Default, PartialEq, Eq, Clone, Copy)]
pub enum SortColumn {
    #[default]
    PID,
    Name,
}

pub struct ProcessTable {
    pub sort_column: SortColumn,
    pub sort_descending: bool,
    pub show_pid: bool,
    /// Pids with a signal in flight.
    pending: Arc<Mutex<HashSet<i32>>>,
    scanner: Arc<Scanner>,
    last_action: LastAction,
}

impl ProcessTable {
    pub fn new(scanner: Arc<Scanner>, last_action: LastAction) -> Self {
        Self {
            sort_column: SortColumn::PID,
            sort_descending: false,
            show_pid: true,
            pending: Arc::new(Mutex::new(HashSet::new())),
            scanner,
            last_action,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        processes: &[ProcessInfo],
        search_text: &str,
        exact: bool,
    ) -> usize {
        let mut sorted_processes = filter_processes(processes, search_text, exact);
        sorted_processes.sort_by(|a, b| {
            let ord = match self.sort_column {
                SortColumn::PID => a.pid.cmp(&b.pid),
                SortColumn::Name => a.name.cmp(&b.name).then(a.pid.cmp(&b.pid)),
            };
            if self.sort_descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let text_sz = 16.0;
        let row_height = 30.0;

        let mut table_builder = TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center));

        if self.show_pid {
            table_builder = table_builder.column(Column::exact(90.0)); // PID
        }
        table_builder = table_builder.column(Column::remainder()); // Name

        table_builder
            .header(row_height, |mut header| {
                if self.show_pid {
                    header.col(|ui| {
                        sort_header(
                            ui,
                            "PID",
                            SortColumn::PID,
                            &mut self.sort_column,
                            &mut self.sort_descending,
                        )
                    });
                }
                header.col(|ui| {
                    sort_header(
                        ui,
                        "Name",
                        SortColumn::Name,
                        &mut self.sort_column,
                        &mut self.sort_descending,
                    )
                });
            })
            .body(|body| {
                body.rows(row_height, sorted_processes.len(), |mut row| {
                    let idx = row.index();
                    let p = &sorted_processes[idx];

                    if self.show_pid {
                        row.col(|ui| {
                            let response = ui.add(
                                egui::Label::new(
                                    egui::RichText::new(p.pid.to_string())
                                        .size(text_sz)
                                        .monospace(),
                                )
                                .sense(egui::Sense::click()),
                            );
                            response.context_menu(|ui| {
                                self.show_context_menu(ui, p);
                            });
                        });
                    }

                    row.col(|ui| {
                        let response = ui.add(
                            egui::Label::new(egui::RichText::new(&p.name).size(text_sz))
                                .sense(egui::Sense::click()),
                        );
                        response.clone().on_hover_text(format!(
                            "{}\nPID: {}\nRight-click for options",
                            p.name, p.pid
                        ));

                        response.context_menu(|ui| {
                            self.show_context_menu(ui, p);
                        });
                    });
                });
            });

        sorted_processes.len()
    }

    fn show_context_menu(&mut self, ui: &mut egui::Ui, p: &ProcessInfo) {
        ui.set_min_width(220.0);

        let is_pending = self
            .pending
            .lock()
            .map(|pending| pending.contains(&p.pid))
            .unwrap_or(false);

        for (label, signal) in [
            ("Terminate (SIGTERM)", Signal::SIGTERM),
            ("Kill (SIGKILL)", Signal::SIGKILL),
        ] {
            let button = ui.add_enabled(
                !is_pending,
                egui::Button::new(label)
                    .fill(egui::Color32::from_rgb(200, 40, 40))
                    .min_size(egui::vec2(200.0, 25.0)),
            );
            if button.clicked() {
                self.signal_pid(p.pid, signal);
                ui.close_menu();
            }
        }

        if ui
            .button(format!("SIGTERM all named \"{}\"", p.name))
            .clicked()
        {
            self.signal_name(p.name.clone(), Signal::SIGTERM);
            ui.close_menu();
        }

        ui.separator();
        ui.label(format!("PID: {}", p.pid));
        ui.label(format!("Name: {}", p.name));
    }

    fn signal_pid(&self, pid: i32, signal: Signal) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(pid);
        }
        let pending = Arc::clone(&self.pending);
        let last_action = self.last_action.clone();

        tokio::task::spawn_blocking(move || {
            match send_signal(pid, signal as i32) {
                Ok(()) => {
                    info!(pid, ?signal, "signal sent");
                    last_action.succeeded(format!("Sent {signal} to {pid}"));
                }
                Err(e) => last_action.failed(e.to_string()),
            }
            if let Ok(mut pending) = pending.lock() {
                pending.remove(&pid);
            }
        });
    }

    fn signal_name(&self, name: String, signal: Signal) {
        let scanner = Arc::clone(&self.scanner);
        let last_action = self.last_action.clone();

        tokio::task::spawn_blocking(move || match scanner.signal_by_name(&name, signal as i32) {
            Ok(count) => {
                info!(name = %name, count, ?signal, "batch signal sent");
                last_action.succeeded(format!("Sent {signal} to {count} \"{name}\" processes"));
            }
            Err(e) => last_action.failed(e.to_string()),
        });
    }
}

fn sort_header(
    ui: &mut egui::Ui,
    title: &str,
    col: SortColumn,
    sort_col: &mut SortColumn,
    descending: &mut bool,
) {
    let active = *sort_col == col;
    let arrow = if !active {
        ""
    } else if *descending {
        " ↓"
    } else {
        " ↑"
    };
    let btn = egui::Button::new(
        egui::RichText::new(format!("{title}{arrow}"))
            .strong()
            .size(15.0),
    )
    .frame(false);

    if ui.add(btn).clicked() {
        if active {
            *descending = !*descending;
        } else {
            *sort_col = col;
            *descending = false;
        }
    }
}
