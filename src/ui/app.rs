//! Main application UI.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, Align, Layout};
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;

use crate::access::AccessScope;
use crate::config::AppConfig;
use crate::db::{self, TableCounts};
use crate::entities::{departments, equipment, users, warehouses};
use crate::reports::{GeneratedReport, ReportDataService, ReportExporter, ReportParameters};
use crate::search::LiveFilter;

use super::components::colors;
use super::{dashboard, equipment_panel, reports_panel};

/// Current panel being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Dashboard,
    Reports,
    Equipment,
}

impl Panel {
    pub fn name(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Главная",
            Panel::Reports => "Отчеты",
            Panel::Equipment => "Спецтехника",
        }
    }
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    // Reference data
    DepartmentsLoaded(Vec<departments::Model>),
    WarehousesLoaded(Vec<warehouses::Model>),
    EquipmentLoaded(Vec<equipment::Model>),
    FavoritesLoaded(Vec<i32>),
    CountsLoaded(TableCounts),
    LoadError(String),

    // Reports
    ReportGenerated(ReportParameters, GeneratedReport),
    ReportFailed(String),
    ExportCompleted(PathBuf),
    ExportFailed(String),

    // Favorites
    FavoriteToggled { equipment_id: i32, is_favorite: bool },
    OperationFailed(String),
}

/// Application state.
pub struct App {
    rt: tokio::runtime::Runtime,
    pool: DatabaseConnection,
    tx: mpsc::UnboundedSender<UiMessage>,
    rx: mpsc::UnboundedReceiver<UiMessage>,

    pub current_panel: Panel,
    pub config: AppConfig,

    // Session
    pub user: Option<users::Model>,
    pub scope: AccessScope,

    // Reference data, already narrowed to the access scope
    pub departments: Vec<departments::Model>,
    pub warehouses: Vec<warehouses::Model>,
    pub equipment: Vec<equipment::Model>,
    pub table_counts: Option<TableCounts>,

    // Reports
    pub report_params: ReportParameters,
    /// Report on screen together with the parameters that produced it.
    pub report: Option<(ReportParameters, GeneratedReport)>,
    pub is_generating: bool,
    pub is_exporting: bool,

    // Equipment search
    pub equipment_search: String,
    pub equipment_filter: LiveFilter<equipment::Model>,
    pub favorites: HashSet<i32>,
    pub only_favorites: bool,

    // Dialogs
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl App {
    pub fn new(
        pool: DatabaseConnection,
        config: AppConfig,
        rt: tokio::runtime::Runtime,
        user: Option<users::Model>,
        scope: AccessScope,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let debounce = Duration::from_millis(config.search.debounce_ms);

        let mut app = Self {
            rt,
            pool,
            tx,
            rx,
            current_panel: Panel::default(),
            config,
            user,
            scope,
            departments: Vec::new(),
            warehouses: Vec::new(),
            equipment: Vec::new(),
            table_counts: None,
            report_params: ReportParameters::default(),
            report: None,
            is_generating: false,
            is_exporting: false,
            equipment_search: String::new(),
            equipment_filter: LiveFilter::new(debounce),
            favorites: HashSet::new(),
            only_favorites: false,
            error_message: None,
            success_message: None,
        };

        app.load_reference_data();
        app.load_favorites();
        app
    }

    /// Load departments, warehouses, equipment and counters.
    pub fn load_reference_data(&mut self) {
        let pool = self.pool.clone();
        let tx = self.tx.clone();
        let scope = self.scope.clone();

        self.rt.spawn(async move {
            match db::department::list_visible(&pool, &scope).await {
                Ok(depts) => {
                    let _ = tx.send(UiMessage::DepartmentsLoaded(depts));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::LoadError(e.to_string()));
                }
            }

            match db::warehouse::list_all(&pool).await {
                Ok(mut whs) => {
                    whs.retain(|w| w.is_active && scope.allows_warehouse(w.department_id, w.id));
                    let _ = tx.send(UiMessage::WarehousesLoaded(whs));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::LoadError(e.to_string()));
                }
            }

            match db::equipment::list_active(&pool).await {
                Ok(items) => {
                    let _ = tx.send(UiMessage::EquipmentLoaded(items));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::LoadError(e.to_string()));
                }
            }

            if let Ok(counts) = db::get_table_counts(&pool).await {
                let _ = tx.send(UiMessage::CountsLoaded(counts));
            }
        });
    }

    pub fn load_favorites(&mut self) {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            return;
        };
        let pool = self.pool.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match db::favorite::list_for_user(&pool, user_id).await {
                Ok(ids) => {
                    let _ = tx.send(UiMessage::FavoritesLoaded(ids));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::LoadError(e.to_string()));
                }
            }
        });
    }

    /// Run the selected report in the background.
    pub fn generate_report(&mut self) {
        if self.is_generating {
            return;
        }
        let params = self.report_params.clone();
        if let Err(e) = params.validate() {
            self.error_message = Some(e.to_string());
            return;
        }

        self.is_generating = true;
        let service = ReportDataService::new(self.pool.clone(), self.scope.clone());
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match service.generate(&params).await {
                Ok(report) => {
                    let _ = tx.send(UiMessage::ReportGenerated(params, report));
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::ReportFailed(e.to_string()));
                }
            }
        });
    }

    /// Write the report on screen to an Excel file.
    pub fn export_report(&mut self) {
        let Some((params, report)) = self.report.clone() else {
            self.error_message = Some("Сначала сформируйте отчет".to_string());
            return;
        };
        if self.is_exporting {
            return;
        }

        self.is_exporting = true;
        let exporter = ReportExporter::from_config(&self.config.export);
        let tx = self.tx.clone();

        self.rt.spawn_blocking(move || match exporter.export(&report, &params) {
            Ok(path) => {
                let _ = tx.send(UiMessage::ExportCompleted(path));
            }
            Err(e) => {
                let _ = tx.send(UiMessage::ExportFailed(e.to_string()));
            }
        });
    }

    /// Feed the equipment search box into the debounced filter.
    pub fn search_equipment(&mut self) {
        let text = self.equipment_search.clone();
        self.equipment_filter.input(self.rt.handle(), &text);
    }

    pub fn toggle_favorite(&mut self, equipment_id: i32) {
        let Some(user_id) = self.user.as_ref().map(|u| u.id) else {
            self.error_message = Some("Пользователь не определен".to_string());
            return;
        };
        let was_favorite = self.favorites.contains(&equipment_id);
        let pool = self.pool.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = if was_favorite {
                db::favorite::remove(&pool, user_id, equipment_id).await
            } else {
                db::favorite::add(&pool, user_id, equipment_id).await
            };
            match result {
                Ok(_) => {
                    let _ = tx.send(UiMessage::FavoriteToggled {
                        equipment_id,
                        is_favorite: !was_favorite,
                    });
                }
                Err(e) => {
                    let _ = tx.send(UiMessage::OperationFailed(e.to_string()));
                }
            }
        });
    }

    /// Append to the audit log without waiting for the result.
    fn record_audit(&self, action: &'static str, entity: &'static str, details: String) {
        let pool = self.pool.clone();
        let user_id = self.user.as_ref().map(|u| u.id);

        self.rt.spawn(async move {
            if let Err(e) = db::audit::record(&pool, user_id, action, entity, None, Some(details)).await {
                tracing::warn!("Audit record failed: {}", e);
            }
        });
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::DepartmentsLoaded(depts) => {
                    self.departments = depts;
                }
                UiMessage::WarehousesLoaded(whs) => {
                    self.warehouses = whs;
                }
                UiMessage::EquipmentLoaded(items) => {
                    tracing::debug!("Loaded {} equipment items", items.len());
                    self.equipment_filter.set_items(items.clone());
                    self.equipment = items;
                }
                UiMessage::FavoritesLoaded(ids) => {
                    self.favorites = ids.into_iter().collect();
                }
                UiMessage::CountsLoaded(counts) => {
                    self.table_counts = Some(counts);
                }
                UiMessage::LoadError(e) => {
                    tracing::error!("Load failed: {}", e);
                    self.error_message = Some(e);
                }
                UiMessage::ReportGenerated(params, report) => {
                    self.is_generating = false;
                    if report.rows.is_empty() {
                        self.success_message = Some("Нет данных за выбранный период".to_string());
                    }
                    self.report = Some((params, report));
                }
                UiMessage::ReportFailed(e) => {
                    self.is_generating = false;
                    tracing::error!("Report failed: {}", e);
                    self.error_message = Some(format!("Ошибка формирования отчета: {e}"));
                }
                UiMessage::ExportCompleted(path) => {
                    self.is_exporting = false;
                    self.record_audit("export", "report", path.display().to_string());
                    self.success_message = Some(format!("Отчет сохранен: {}", path.display()));
                }
                UiMessage::ExportFailed(e) => {
                    self.is_exporting = false;
                    tracing::error!("Export failed: {}", e);
                    self.error_message = Some(format!("Ошибка экспорта: {e}"));
                }
                UiMessage::FavoriteToggled {
                    equipment_id,
                    is_favorite,
                } => {
                    if is_favorite {
                        self.favorites.insert(equipment_id);
                    } else {
                        self.favorites.remove(&equipment_id);
                    }
                }
                UiMessage::OperationFailed(e) => {
                    self.error_message = Some(e);
                }
            }
        }

        self.equipment_filter.poll();
    }

    fn is_busy(&self) -> bool {
        self.is_generating || self.is_exporting || self.equipment_filter.is_pending()
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.user {
                        Some(user) => {
                            ui.colored_label(colors::SUCCESS, format!("Пользователь: {}", user.full_name));
                        }
                        None => {
                            ui.colored_label(colors::WARNING, "Пользователь не найден");
                        }
                    }
                    if !self.scope.is_unrestricted() {
                        ui.colored_label(colors::NEUTRAL, "(ограниченный доступ)");
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.is_generating {
                            ui.label("Формирование отчета...");
                            ui.spinner();
                        } else if self.is_exporting {
                            ui.label("Экспорт...");
                            ui.spinner();
                        } else {
                            ui.colored_label(colors::NEUTRAL, self.current_panel.name());
                        }
                    });
                });
            });
    }

    /// Render modal dialogs (error, success).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Ошибка")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Готово")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_async_results();

        // Keep polling while background work is in flight
        if self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.show_status_bar(ctx);
        self.show_dialogs(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.current_panel {
            Panel::Dashboard => {
                if let Some(next) = dashboard::show(self, ui) {
                    self.current_panel = next;
                }
            }
            Panel::Reports => {
                if reports_panel::show(self, ui) {
                    self.current_panel = Panel::Dashboard;
                }
            }
            Panel::Equipment => {
                if equipment_panel::show(self, ui) {
                    self.current_panel = Panel::Dashboard;
                }
            }
        });
    }
}
