use super::style;
use super::LeafScanApp;
use crate::classify::Prediction;
use eframe::egui::{
    self, Align, Align2, Color32, CursorIcon, FontId, Layout, Margin, Rect, RichText, Sense, Shape,
    Stroke,
};

/// Icon and caption for each chip in the idle-screen feature row.
const FEATURE_CHIPS: [(&str, &str); 3] = [
    ("⚡", "Instant Results"),
    ("🎯", "99% Accuracy"),
    ("🔒", "Secure & Private"),
];

impl LeafScanApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 26.0;
            let footer_margin = 10.0;
            let content_height = total_height - footer_height - footer_margin;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(16.0);
                    self.render_header(ui);
                    ui.add_space(16.0);
                    self.render_upload_card(ui);
                    ui.add_space(12.0);
                    self.render_history_panel(ui);
                    if self.session.selected.is_none() {
                        ui.add_space(16.0);
                        self.render_feature_chips(ui);
                    }
                    ui.add_space(16.0);
                });

            ui.with_layout(Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(footer_margin);
                self.render_footer(ui);
            });
        });
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("🌿 LeafScan AI")
                    .size(26.0)
                    .strong()
                    .color(style::accent()),
            );
            ui.label(
                RichText::new("Smart Leaf Analysis")
                    .size(13.0)
                    .color(muted(ui)),
            );
            ui.add_space(10.0);
            ui.label(RichText::new("Protect Your Potato Crops").size(19.0).strong());
            ui.label(
                RichText::new(
                    "Upload a photo of your potato plant leaf and our AI will instantly \
                     detect Early Blight, Late Blight, or confirm it's healthy.",
                )
                .size(13.0)
                .color(muted(ui)),
            );
        });
    }

    fn render_upload_card(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());

            if self.session.selected.is_none() {
                self.render_dropzone(ui);
            } else {
                self.render_preview(ui);
            }

            if self.session.is_submitting() {
                self.render_loading(ui);
            }
            if let Some(prediction) = self.session.prediction().cloned() {
                ui.add_space(10.0);
                self.render_result_card(ui, &prediction);
            }
            if let Some(message) = self.session.error_message().map(str::to_owned) {
                ui.add_space(10.0);
                self.render_error_card(ui, &message);
            }

            if self.session.is_settled() {
                ui.add_space(10.0);
                ui.vertical_centered(|ui| {
                    let button =
                        egui::Button::new("🔄 Try Another Image").min_size(egui::vec2(200.0, 36.0));
                    if ui.add(button).clicked() {
                        self.clear();
                    }
                });
            }
        });
    }

    /// The click-or-drop target shown while nothing is selected. Drops land
    /// through the window-level hook; this area handles clicks and echoes the
    /// drag state.
    fn render_dropzone(&mut self, ui: &mut egui::Ui) {
        let drag_active = ui.ctx().input(|input| !input.raw.hovered_files.is_empty());
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), 170.0), Sense::click());
        let response = response.on_hover_cursor(CursorIcon::PointingHand);

        let accent = style::accent();
        let border = if drag_active || response.hovered() {
            Stroke::new(2.0, accent)
        } else {
            Stroke::new(2.0, accent.gamma_multiply(0.5))
        };

        let painter = ui.painter();
        painter.rect_filled(rect, 12.0, ui.visuals().extreme_bg_color);
        dashed_border(painter, rect.shrink(2.0), border);

        let caption = if drag_active {
            "Drop the image here..."
        } else {
            "Drag & drop a potato leaf image here, or click to select"
        };
        painter.text(
            rect.center() - egui::vec2(0.0, 22.0),
            Align2::CENTER_CENTER,
            "📤",
            FontId::proportional(38.0),
            accent,
        );
        painter.text(
            rect.center() + egui::vec2(0.0, 20.0),
            Align2::CENTER_CENTER,
            caption,
            FontId::proportional(13.0),
            muted(ui),
        );

        if response.clicked() {
            self.open_picker(ui.ctx());
        }
    }

    fn render_preview(&self, ui: &mut egui::Ui) {
        let Some(selected) = &self.session.selected else {
            return;
        };
        ui.vertical_centered(|ui| {
            match &self.preview_texture {
                Some(texture) => {
                    let size = texture.size_vec2();
                    let max_width = (ui.available_width() - 16.0).max(1.0);
                    let scale = (max_width / size.x).min(260.0 / size.y).min(1.0);
                    let (rect, _) = ui.allocate_exact_size(size * scale, Sense::hover());
                    let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
                }
                None => {
                    ui.label(RichText::new("🍃").size(38.0));
                    ui.label(
                        RichText::new("No local preview for this file")
                            .size(12.0)
                            .color(muted(ui)),
                    );
                }
            }
            ui.add_space(4.0);
            ui.label(
                RichText::new(format!("{} · {}", selected.file_name, selected.size_label()))
                    .size(12.0)
                    .color(muted(ui)),
            );
        });
    }

    fn render_loading(&self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.add(egui::Spinner::new().size(32.0).color(style::accent()));
            ui.add_space(6.0);
            ui.label(RichText::new("Analyzing your image...").color(muted(ui)));
        });
    }

    fn render_result_card(&self, ui: &mut egui::Ui, prediction: &Prediction) {
        let verdict = style::verdict_for(&prediction.class);
        egui::Frame::none()
            .fill(verdict.fill)
            .stroke(Stroke::new(1.0, verdict.stroke))
            .rounding(12.0)
            .inner_margin(Margin::same(14.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(verdict.icon).size(38.0));
                    ui.label(
                        RichText::new("DISEASE DETECTION RESULT")
                            .size(11.0)
                            .color(muted(ui)),
                    );
                    ui.label(
                        RichText::new(prediction.class.as_str())
                            .size(25.0)
                            .strong()
                            .color(verdict.color),
                    );
                    ui.add_space(8.0);
                    let fraction = prediction.confidence.clamp(0.0, 1.0) as f32;
                    ui.add(
                        egui::ProgressBar::new(fraction)
                            .fill(verdict.color)
                            .desired_width(ui.available_width() * 0.85),
                    );
                    ui.label(
                        RichText::new(format!(
                            "Confidence: {}",
                            style::confidence_label(prediction.confidence)
                        ))
                        .size(13.0),
                    );
                });
            });
    }

    fn render_error_card(&self, ui: &mut egui::Ui, message: &str) {
        let verdict = style::error_verdict();
        egui::Frame::none()
            .fill(verdict.fill)
            .stroke(Stroke::new(1.0, verdict.stroke))
            .rounding(12.0)
            .inner_margin(Margin::same(14.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(verdict.icon).size(30.0));
                    ui.label(
                        RichText::new("Analysis Failed")
                            .size(17.0)
                            .strong()
                            .color(verdict.color),
                    );
                    ui.label(RichText::new(message).size(13.0));
                });
            });
    }

    fn render_history_panel(&mut self, ui: &mut egui::Ui) {
        if self.session.history.is_empty() {
            return;
        }
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Recent Predictions").strong());
                egui::Frame::none()
                    .fill(style::accent())
                    .rounding(10.0)
                    .inner_margin(Margin::symmetric(7.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(self.session.history.len().to_string())
                                .size(11.0)
                                .strong()
                                .color(Color32::WHITE),
                        );
                    });
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let toggle = if self.session.show_history {
                        "Hide"
                    } else {
                        "Show"
                    };
                    if ui.small_button(toggle).clicked() {
                        self.session.show_history = !self.session.show_history;
                    }
                });
            });

            if self.session.show_history {
                for entry in &self.session.history {
                    ui.separator();
                    ui.horizontal(|ui| {
                        let verdict = style::verdict_for(&entry.class);
                        ui.label(RichText::new(verdict.icon).color(verdict.color));
                        ui.label(RichText::new(entry.class.as_str()).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.label(
                                RichText::new(format!(
                                    "{} confidence",
                                    style::confidence_label(entry.confidence)
                                ))
                                .size(12.0)
                                .color(muted(ui)),
                            );
                        });
                    });
                }
            }
        });
    }

    fn render_feature_chips(&self, ui: &mut egui::Ui) {
        ui.columns(FEATURE_CHIPS.len(), |columns| {
            for (column, (icon, caption)) in columns.iter_mut().zip(FEATURE_CHIPS) {
                feature_chip(column, icon, caption);
            }
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(format!("Classifier: {}", self.client.endpoint()))
                    .size(11.0)
                    .color(muted(ui)),
            );
        });
    }
}

fn feature_chip(ui: &mut egui::Ui, icon: &str, caption: &str) {
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(icon).size(22.0));
        ui.label(RichText::new(caption).size(12.0).color(muted(ui)));
    });
}

fn dashed_border(painter: &egui::Painter, rect: Rect, stroke: Stroke) {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    for idx in 0..corners.len() {
        let segment = [corners[idx], corners[(idx + 1) % corners.len()]];
        painter.extend(Shape::dashed_line(&segment, stroke, 7.0, 5.0));
    }
}

fn muted(ui: &egui::Ui) -> Color32 {
    ui.visuals().text_color().gamma_multiply(0.7)
}
