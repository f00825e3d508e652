//! Header component with title, search, and column menu.

use eframe::egui;

#[derive(Default)]
pub struct Header {
    pub search_text: String,
    /// Match whole names only, the way signal-by-name does.
    pub exact_match: bool,
}

impl Header {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        process_table: &mut crate::ui::process_table::ProcessTable,
    ) -> (bool, bool) {
        // Returns (search_changed, refresh_requested)
        let mut search_changed = false;
        let mut refresh_requested = false;

        ui.horizontal(|ui| {
            ui.heading("Proctable");

            ui.add_space(20.0);
            ui.label("Search:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_text)
                    .hint_text("Name or PID...")
                    .desired_width(200.0),
            );

            if response.changed() {
                search_changed = true;
            }

            if !self.search_text.is_empty() && ui.button("Clear").clicked() {
                self.search_text.clear();
                search_changed = true;
            }

            if ui.checkbox(&mut self.exact_match, "Exact").changed() {
                search_changed = true;
            }

            ui.add_space(10.0);
            if ui
                .button("Refresh")
                .on_hover_text("Take a new snapshot of the process table.")
                .clicked()
            {
                refresh_requested = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("Menu", |ui| {
                    ui.set_min_width(120.0);

                    ui.label("Show columns:");
                    ui.checkbox(&mut process_table.show_pid, "PID");
                });
            });
        });

        (search_changed, refresh_requested)
    }
}
