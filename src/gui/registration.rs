use crate::license::GateState;
use eframe::egui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationAction {
    Submit(String),
    Cancel,
}

/// Token entry shown in the main window until the launcher is unlocked.
#[derive(Default)]
pub struct RegistrationDialog {
    token: String,
}

impl RegistrationDialog {
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        state: GateState,
        error: Option<&str>,
    ) -> Option<RegistrationAction> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.heading("Float Launcher");
            ui.add_space(8.0);
            match state {
                GateState::Unverified => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Checking license...");
                    });
                }
                GateState::AwaitingToken => {
                    ui.label("Enter your API token to activate the launcher.");
                    let resp = ui.add(
                        egui::TextEdit::singleline(&mut self.token)
                            .password(true)
                            .hint_text("API token")
                            .desired_width(280.0),
                    );
                    let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if let Some(err) = error {
                        ui.colored_label(ui.visuals().error_fg_color, err);
                    }
                    if ui.button("Submit").clicked() || enter {
                        action = Some(RegistrationAction::Submit(self.token.clone()));
                    }
                }
                GateState::Verifying => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Verifying token...");
                    });
                    if ui.button("Cancel").clicked() {
                        action = Some(RegistrationAction::Cancel);
                    }
                }
            }
        });
        if matches!(action, Some(RegistrationAction::Submit(_))) {
            tracing::debug!("token submitted");
        }
        action
    }

    pub fn clear(&mut self) {
        self.token.clear();
    }
}
