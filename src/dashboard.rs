use crate::widget::StatusWidget;

#[cfg(feature = "ui")]
use crate::widget::Tone;
#[cfg(feature = "ui")]
use eframe::egui;

#[cfg(feature = "ui")]
pub struct DashboardApp {
    widget: StatusWidget,
}

#[cfg(feature = "ui")]
pub fn run_dashboard(widget: StatusWidget) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(360.0, 200.0)),
        ..Default::default()
    };
    eframe::run_native(
        "API Status",
        options,
        Box::new(move |_cc| Box::new(DashboardApp { widget })),
    )
    .map_err(|e| anyhow::anyhow!("dashboard failed: {}", e))
}

#[cfg(feature = "ui")]
fn tone_color(tone: Tone) -> Option<egui::Color32> {
    match tone {
        Tone::Neutral => None,
        Tone::Success => Some(egui::Color32::GREEN),
        Tone::Failure => Some(egui::Color32::RED),
    }
}

#[cfg(feature = "ui")]
impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = self.widget.poll();
        let view = self.widget.view();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(view.heading);

                if let Some(message) = view.message {
                    match tone_color(view.tone) {
                        Some(color) => ui.colored_label(color, message),
                        None => ui.label(message),
                    };
                }

                ui.separator();
                let button = egui::Button::new(view.button_label);
                if ui.add_enabled(view.button_enabled, button).clicked() {
                    tracing::debug!("{:?} clicked in {:?}", view.action, state);
                    self.widget.activate();
                }
            });
        });

        if self.widget.state() == crate::widget::CheckState::Checking {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(not(feature = "ui"))]
pub fn run_dashboard(_widget: StatusWidget) -> anyhow::Result<()> {
    tracing::info!("Dashboard requires 'ui' feature. Build with: cargo build --features ui");
    Ok(())
}
