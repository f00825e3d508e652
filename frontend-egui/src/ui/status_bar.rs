//! Status bar component showing process counts and the last action's outcome.

use eframe::egui;
use proctable::ProcessInfo;
use std::sync::{Arc, Mutex};

/// Outcome of the most recent signal or refresh, shared with worker tasks.
#[derive(Clone, Default)]
pub struct LastAction(Arc<Mutex<Option<Result<String, String>>>>);

impl LastAction {
    pub fn succeeded(&self, message: String) {
        self.set(Ok(message));
    }

    pub fn failed(&self, message: String) {
        self.set(Err(message));
    }

    fn set(&self, outcome: Result<String, String>) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(outcome);
        }
    }

    fn get(&self) -> Option<Result<String, String>> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }
}

pub struct StatusBar;

impl StatusBar {
    pub fn show(
        ui: &mut egui::Ui,
        processes: &[ProcessInfo],
        filtered_count: usize,
        last_action: &LastAction,
    ) {
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(format!("Total processes: {}", processes.len()));

            if filtered_count != processes.len() {
                ui.separator();
                ui.label(format!("Filtered: {}", filtered_count));
            }

            match last_action.get() {
                Some(Ok(message)) => {
                    ui.separator();
                    ui.label(message);
                }
                Some(Err(message)) => {
                    ui.separator();
                    ui.colored_label(egui::Color32::from_rgb(230, 80, 80), message);
                }
                None => {}
            }
        });
    }
}
