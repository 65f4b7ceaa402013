use crate::prompts::PromptStore;
use eframe::egui;

pub const COPIED_MESSAGE: &str = "Content copied to clipboard!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Browse,
}

/// What the dialog wants the app to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Info(String),
    Error(String),
}

pub struct PromptDialog {
    pub open: bool,
    mode: Mode,
    name: String,
    content: String,
    files: Vec<String>,
    selected: Option<String>,
}

impl Default for PromptDialog {
    fn default() -> Self {
        Self {
            open: false,
            mode: Mode::Create,
            name: String::new(),
            content: String::new(),
            files: Vec::new(),
            selected: None,
        }
    }
}

fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let mut cb = arboard::Clipboard::new()?;
    cb.set_text(text.to_string())?;
    Ok(())
}

impl PromptDialog {
    pub fn open_create(&mut self) {
        self.mode = Mode::Create;
        self.name.clear();
        self.content.clear();
        self.open = true;
    }

    pub fn open_browse(&mut self, store: &PromptStore) -> Option<PromptOutcome> {
        self.mode = Mode::Browse;
        self.selected = None;
        self.content.clear();
        self.open = true;
        self.refresh(store)
    }

    fn refresh(&mut self, store: &PromptStore) -> Option<PromptOutcome> {
        match store.list() {
            Ok(files) => {
                self.files = files;
                None
            }
            Err(e) => {
                self.files.clear();
                Some(PromptOutcome::Error(format!("Failed to list prompts: {e}")))
            }
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, store: &PromptStore) -> Option<PromptOutcome> {
        if !self.open {
            return None;
        }
        let mut open = self.open;
        let mut outcome = None;
        let title = match self.mode {
            Mode::Create => "Create Prompt",
            Mode::Browse => "Prompts",
        };
        egui::Window::new(title)
            .open(&mut open)
            .collapsible(false)
            .show(ctx, |ui| {
                outcome = match self.mode {
                    Mode::Create => self.create_ui(ui, store),
                    Mode::Browse => self.browse_ui(ui, store),
                };
            });
        self.open = open && self.open;
        outcome
    }

    fn create_ui(&mut self, ui: &mut egui::Ui, store: &PromptStore) -> Option<PromptOutcome> {
        ui.horizontal(|ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut self.name);
        });
        ui.add(egui::TextEdit::multiline(&mut self.content).desired_rows(8));
        let mut outcome = None;
        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                outcome = Some(match store.save(&self.name, &self.content) {
                    Ok(file) => {
                        self.open = false;
                        PromptOutcome::Info(format!("Saved {file}"))
                    }
                    Err(e) => PromptOutcome::Error(e.to_string()),
                });
            }
            if ui.button("Cancel").clicked() {
                self.open = false;
            }
        });
        outcome
    }

    fn browse_ui(&mut self, ui: &mut egui::Ui, store: &PromptStore) -> Option<PromptOutcome> {
        let mut outcome = None;
        ui.horizontal(|ui| {
            egui::ScrollArea::vertical()
                .id_source("prompt_files")
                .max_height(240.0)
                .show(ui, |ui| {
                    for file in &self.files {
                        let selected = self.selected.as_deref() == Some(file.as_str());
                        if ui.selectable_label(selected, file).clicked() && !selected {
                            match store.read(file) {
                                Ok(text) => {
                                    self.content = text;
                                    self.selected = Some(file.clone());
                                }
                                Err(e) => {
                                    outcome =
                                        Some(PromptOutcome::Error(format!("Failed to read {file}: {e}")));
                                }
                            }
                        }
                    }
                });
            ui.add(egui::TextEdit::multiline(&mut self.content).desired_rows(10));
        });
        ui.horizontal(|ui| {
            let has_selection = self.selected.is_some();
            if ui.add_enabled(has_selection, egui::Button::new("Copy")).clicked() {
                outcome = Some(match copy_to_clipboard(&self.content) {
                    Ok(()) => PromptOutcome::Info(COPIED_MESSAGE.into()),
                    Err(e) => PromptOutcome::Error(format!("Failed to copy: {e}")),
                });
            }
            if ui.add_enabled(has_selection, egui::Button::new("Save")).clicked() {
                if let Some(name) = self.selected.clone() {
                    outcome = Some(match store.save(&name, &self.content) {
                        Ok(file) => PromptOutcome::Info(format!("Saved {file}")),
                        Err(e) => PromptOutcome::Error(e.to_string()),
                    });
                }
            }
            if ui.add_enabled(has_selection, egui::Button::new("Delete")).clicked() {
                if let Some(name) = self.selected.take() {
                    if let Err(e) = store.remove(&name) {
                        outcome = Some(PromptOutcome::Error(format!("Failed to delete {name}: {e}")));
                    }
                    self.content.clear();
                    if let Some(err) = self.refresh(store) {
                        outcome = Some(err);
                    }
                }
            }
            if ui.button("Close").clicked() {
                self.open = false;
            }
        });
        outcome
    }
}
