/*!
 * Desktop viewer for census-scatter
 *
 * - Open a CSV dataset from disk or an http(s) URL
 * - Pick the x and y fields and watch the marks move
 * - Hover a circle to see its district, export the current frame as SVG
 */

use census_scatter::axis::{AxisModel, Orientation};
use census_scatter::render::Frame;
use census_scatter::scale::build_scales;
use census_scatter::{
    Axis, Chart, ChartConfig, DataSource, Dataset, SelectionController, fit_selection, loader, viz,
};
use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Stroke};
use std::sync::mpsc;
use std::thread;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = ChartConfig::load(None).unwrap_or_else(|e| {
        log::warn!("ignoring configuration: {}", e);
        ChartConfig::default()
    });
    let initial = std::env::args().nth(1);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32 + 220.0, config.height as f32 + 80.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Census scatterplot"),
        ..Default::default()
    };

    eframe::run_native(
        "census-scatter",
        options,
        Box::new(move |_cc| {
            let mut app = CensusApp::new(config);
            if let Some(src) = initial {
                app.source = src;
                app.start_load();
            }
            Ok(Box::new(app))
        }),
    )
}

#[derive(Debug)]
enum LoadResult {
    Loaded(Dataset, String),
    Error(String),
}

struct CensusApp {
    config: ChartConfig,
    source: String,
    chart: Option<Chart>,
    controller: Option<SelectionController>,

    is_loading: bool,
    status_message: String,
    error_message: String,
    load_receiver: Option<mpsc::Receiver<LoadResult>>,
}

impl CensusApp {
    fn new(config: ChartConfig) -> Self {
        Self {
            config,
            source: String::new(),
            chart: None,
            controller: None,
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            load_receiver: None,
        }
    }

    fn start_load(&mut self) {
        if self.source.trim().is_empty() {
            self.error_message = "Please enter a CSV path or URL".to_string();
            return;
        }
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = format!("Loading {}...", self.source.trim());

        let (sender, receiver) = mpsc::channel();
        self.load_receiver = Some(receiver);
        let Ok(source) = self.source.parse::<DataSource>();
        let opts = self.config.load_options();

        thread::spawn(move || {
            let result = match loader::load(&source, &opts) {
                Ok(data) => LoadResult::Loaded(data, source.to_string()),
                Err(e) => LoadResult::Error(format!("Failed to load {}: {}", source, e)),
            };
            let _ = sender.send(result);
        });
    }

    fn check_load_result(&mut self, now_ms: f64) {
        if let Some(receiver) = &self.load_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.is_loading = false;
            self.load_receiver = None;
            match result {
                LoadResult::Loaded(data, source) => {
                    let records = data.len();
                    match self.install_dataset(data, now_ms) {
                        Ok(()) => {
                            self.status_message = format!("{} records from {}", records, source);
                            self.error_message.clear();
                        }
                        Err(e) => {
                            self.error_message = e.to_string();
                            self.status_message.clear();
                        }
                    }
                }
                LoadResult::Error(error) => {
                    self.error_message = error;
                    self.status_message.clear();
                }
            }
        }
    }

    /// Keep the current chart (and its marks) when reloading, so records that
    /// survive move instead of re-entering.
    ///
    /// A reload that cannot be plotted leaves the previous dataset in place. A first
    /// load always installs the chart and field pickers, so a failed render can be
    /// fixed by choosing other fields.
    fn install_dataset(&mut self, data: Dataset, now_ms: f64) -> census_scatter::Result<()> {
        let fields = data.numeric_fields();
        let current = self.controller.as_ref().map(|c| c.selection().clone());
        let configured = self.config.initial_selection();
        let selection = fit_selection(current.iter().chain([&configured]), &fields)?;

        match self.chart.as_mut() {
            Some(chart) => {
                build_scales(
                    &data.records,
                    &selection,
                    self.config.plot_area(),
                    self.config.missing_values,
                )?;
                chart.replace_dataset(data)?;
            }
            None => self.chart = Some(Chart::new(data, self.config.clone())?),
        }
        self.controller = Some(SelectionController::new(selection.clone(), fields));
        if let Some(chart) = self.chart.as_mut() {
            chart.render(&selection, now_ms)?;
        }
        Ok(())
    }

    fn change_field(&mut self, axis: Axis, field: &str, now_ms: f64) {
        if let (Some(chart), Some(controller)) = (self.chart.as_mut(), self.controller.as_mut()) {
            match controller.apply(axis, field, chart, now_ms) {
                Ok(outcome) => {
                    log::debug!("{:?}", outcome);
                    self.error_message.clear();
                }
                Err(e) => self.error_message = e.to_string(),
            }
        }
    }

    fn export_svg(&mut self, now_ms: f64) {
        let Some(chart) = self.chart.as_ref() else {
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG", &["svg"])
            .set_file_name("census.svg")
            .save_file()
        {
            match viz::save_frame(&chart.frame(now_ms), &path) {
                Ok(()) => self.status_message = format!("Saved {}", path.display()),
                Err(e) => self.error_message = format!("Export failed: {}", e),
            }
        }
    }

    fn field_picker(&mut self, ui: &mut egui::Ui, axis: Axis, now_ms: f64) {
        let Some(controller) = self.controller.as_ref() else {
            return;
        };
        let current = controller.selection().field(axis).to_string();
        let fields = controller.fields().to_vec();
        let mut picked = None;
        ui.group(|ui| {
            ui.label(match axis {
                Axis::X => "X axis",
                Axis::Y => "Y axis",
            });
            for f in &fields {
                if ui.radio(*f == current, self.config.field_label(f)).clicked() {
                    picked = Some(f.clone());
                }
            }
        });
        if let Some(f) = picked {
            self.change_field(axis, &f, now_ms);
        }
    }
}

impl eframe::App for CensusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = ctx.input(|i| i.time) * 1000.0;
        self.check_load_result(now_ms);

        if self.is_loading {
            ctx.request_repaint();
        }

        egui::SidePanel::left("fields").show(ctx, |ui| {
            ui.heading("Data");
            ui.text_edit_singleline(&mut self.source)
                .on_hover_text("CSV file path or http(s) URL");
            ui.horizontal(|ui| {
                if ui.add_enabled(!self.is_loading, egui::Button::new("Load")).clicked() {
                    self.start_load();
                }
                if ui.add_enabled(!self.is_loading, egui::Button::new("Open…")).clicked()
                    && let Some(path) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file()
                {
                    self.source = path.to_string_lossy().to_string();
                    self.start_load();
                }
            });
            if self.is_loading {
                ui.spinner();
            }
            ui.add_space(10.0);

            self.field_picker(ui, Axis::X, now_ms);
            self.field_picker(ui, Axis::Y, now_ms);

            ui.add_space(10.0);
            if ui
                .add_enabled(self.chart.is_some(), egui::Button::new("Export SVG"))
                .clicked()
            {
                self.export_svg(now_ms);
            }

            ui.add_space(10.0);
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(chart) = self.chart.as_mut() else {
                ui.label("Load a CSV dataset to begin.");
                return;
            };
            chart.prune(now_ms);
            let frame = chart.frame(now_ms);
            if chart.is_animating(now_ms) {
                ctx.request_repaint();
            }
            paint_frame(ui, &frame);
        });
    }
}

fn paint_frame(ui: &mut egui::Ui, frame: &Frame) {
    let size = egui::vec2(frame.width as f32, frame.height as f32);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
    let origin = response.rect.min + egui::vec2(frame.margin.left as f32, frame.margin.top as f32);
    let at = |x: f64, y: f64| origin + egui::vec2(x as f32, y as f32);

    painter.rect_filled(response.rect, 0.0, Color32::WHITE);

    for m in &frame.marks {
        let alpha = (m.state.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        painter.circle_filled(
            at(m.state.x, m.state.y),
            m.radius as f32,
            Color32::from_rgba_unmultiplied(m.color.0, m.color.1, m.color.2, alpha),
        );
    }

    let plot_h = frame.height as f64 - frame.margin.top - frame.margin.bottom;
    let plot_w = frame.width as f64 - frame.margin.left - frame.margin.right;
    if let Some(axis) = &frame.x_axis {
        paint_axis(&painter, axis, at(0.0, plot_h));
        painter.text(
            at(plot_w / 2.0, plot_h + 40.0),
            Align2::CENTER_BOTTOM,
            &axis.title,
            FontId::proportional(14.0),
            Color32::BLACK,
        );
    }
    if let Some(axis) = &frame.y_axis {
        paint_axis(&painter, axis, at(0.0, 0.0));
        // egui text cannot be rotated; the y title sits above the axis instead.
        painter.text(
            at(0.0, -20.0),
            Align2::CENTER_BOTTOM,
            &axis.title,
            FontId::proportional(14.0),
            Color32::BLACK,
        );
    }

    let hovered = response.hover_pos().and_then(|p| {
        frame.marks.iter().rev().find(|m| {
            m.state.opacity > 0.0 && at(m.state.x, m.state.y).distance(p) <= m.radius as f32
        })
    });
    if let Some(m) = hovered {
        response.on_hover_text(format!("{} ({})", m.label, m.group));
    }
}

fn paint_axis(painter: &egui::Painter, axis: &AxisModel, origin: Pos2) {
    let stroke = Stroke::new(1.0, Color32::BLACK);
    let font = FontId::proportional(10.0);
    let (r0, r1) = (axis.range.0 as f32, axis.range.1 as f32);
    match axis.orientation {
        Orientation::Bottom => {
            painter.line_segment([origin + egui::vec2(r0, 0.0), origin + egui::vec2(r1, 0.0)], stroke);
            for t in &axis.ticks {
                let p = origin + egui::vec2(t.position as f32, 0.0);
                painter.line_segment([p, p + egui::vec2(0.0, 6.0)], stroke);
                painter.text(p + egui::vec2(0.0, 9.0), Align2::CENTER_TOP, &t.label, font.clone(), Color32::BLACK);
            }
        }
        Orientation::Left => {
            painter.line_segment([origin + egui::vec2(0.0, r0), origin + egui::vec2(0.0, r1)], stroke);
            for t in &axis.ticks {
                let p = origin + egui::vec2(0.0, t.position as f32);
                painter.line_segment([p, p - egui::vec2(6.0, 0.0)], stroke);
                painter.text(p - egui::vec2(9.0, 0.0), Align2::RIGHT_CENTER, &t.label, font.clone(), Color32::BLACK);
            }
        }
    }
}
