use eframe::{egui, App};
use proctable::{ProcessInfo, ScanConfig, Scanner};
use std::sync::{Arc, Mutex};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use ui::header::Header;
use ui::status_bar::{LastAction, StatusBar};

mod ui;
use ui::process_table::ProcessTable;

#[tokio::main]
async fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let scanner = match ScanConfig::from_env() {
        Ok(config) => Scanner::from_config(&config),
        Err(e) => {
            warn!(error = %e, "invalid scan configuration, using defaults");
            Scanner::default()
        }
    };

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Proctable",
        native_options,
        Box::new(move |cc| {
            // Global black theme
            let mut visuals = egui::Visuals::dark();
            visuals.override_text_color = Some(egui::Color32::WHITE);
            visuals.panel_fill = egui::Color32::BLACK;
            visuals.window_fill = egui::Color32::BLACK;
            cc.egui_ctx.set_visuals(visuals);

            let mut style = (*cc.egui_ctx.style()).clone();
            style.spacing.item_spacing = egui::vec2(10.0, 8.0);
            style.spacing.button_padding = egui::vec2(12.0, 8.0);
            cc.egui_ctx.set_style(style);

            Box::new(ProcessManagerApp::new(Arc::new(scanner)))
        }),
    )
}

struct ProcessManagerApp {
    scanner: Arc<Scanner>,
    processes: Arc<Mutex<Vec<ProcessInfo>>>,
    last_action: LastAction,
    process_table: ProcessTable,
    header: Header,
}

impl ProcessManagerApp {
    fn new(scanner: Arc<Scanner>) -> Self {
        let last_action = LastAction::default();
        let app = Self {
            process_table: ProcessTable::new(Arc::clone(&scanner), last_action.clone()),
            scanner,
            processes: Arc::new(Mutex::new(Vec::new())),
            last_action,
            header: Header::default(),
        };
        // Load processes once at startup
        app.refresh();
        app
    }

    /// Replaces the snapshot; on failure the previous one stays on screen.
    fn refresh(&self) {
        match self.scanner.list_all() {
            Ok(list) => {
                if let Ok(mut proc_lock) = self.processes.lock() {
                    *proc_lock = list;
                }
            }
            Err(e) => {
                error!(error = %e, "process list refresh failed");
                self.last_action.failed(e.to_string());
            }
        }
    }
}

impl App for ProcessManagerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (search_changed, refresh_requested) = self.header.show(ui, &mut self.process_table);
            ui.add_space(6.0);

            if refresh_requested {
                self.refresh();
            }

            // Take a snapshot for rendering
            let processes = match self.processes.lock() {
                Ok(lock) => lock.clone(),
                Err(_) => Vec::new(),
            };

            let filtered_count = self.process_table.show(
                ui,
                &processes,
                &self.header.search_text,
                self.header.exact_match,
            );

            ui.add_space(6.0);

            StatusBar::show(ui, &processes, filtered_count, &self.last_action);

            if search_changed {
                ctx.request_repaint();
            }
        });
    }
}
