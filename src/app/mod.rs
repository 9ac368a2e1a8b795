use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context, Pos2};

use crate::market::{MarketEntity, SizingMode, Timeframe, collect_market_snapshot};
use badges::{BadgeCache, LocalImageResolver};
use bubbles::{BubbleChart, ViewModel};
use scheduler::FixedStepScheduler;
use ui::FrameStats;

mod badges;
mod bubbles;
mod particles;
mod physics;
mod render_utils;
mod scheduler;
mod ui;

const TICK_RATE_HZ: f64 = 60.0;
const WORKER_DISCONNECTED: &str = "Background load worker disconnected";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub snapshot: PathBuf,
    pub images: Option<PathBuf>,
    pub refresh_interval: Duration,
    pub fetch_limit: usize,
    pub max_count: usize,
    pub auto_trim: usize,
    pub timeframe: Timeframe,
    pub mode: SizingMode,
}

type LoadResult = Result<Vec<MarketEntity>, String>;

pub struct BubbleApp {
    config: AppConfig,
    state: AppState,
    refresh_rx: Option<Receiver<LoadResult>>,
    last_load: Instant,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<Dashboard>),
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BuildKey {
    data_revision: u64,
    mode: SizingMode,
    timeframe: Timeframe,
    search_query: String,
    max_count: usize,
}

struct Dashboard {
    entities: Vec<MarketEntity>,
    data_revision: u64,
    view_model: ViewModel,
    auto_trim: usize,
    built: Option<BuildKey>,
    chart: BubbleChart,
    chart_origin: Pos2,
    pointer_inside: bool,
    badges: BadgeCache,
    frame_stats: FrameStats,
    status: Option<String>,
}

impl BubbleApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let state = Self::start_load(&config);
        Self {
            config,
            state,
            refresh_rx: None,
            last_load: Instant::now(),
        }
    }

    fn spawn_load(config: &AppConfig) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let snapshot = config.snapshot.clone();
        let fetch_limit = config.fetch_limit;

        thread::spawn(move || {
            let result = collect_market_snapshot(&snapshot, fetch_limit)
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &AppConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(config),
        }
    }

    fn poll_refresh(&mut self, dashboard_reload: bool) {
        let AppState::Ready(dashboard) = &mut self.state else {
            return;
        };

        let refresh_due = self.last_load.elapsed() >= self.config.refresh_interval;
        if self.refresh_rx.is_none() && (dashboard_reload || refresh_due) {
            self.refresh_rx = Some(Self::spawn_load(&self.config));
            self.last_load = Instant::now();
        }

        let Some(rx) = self.refresh_rx.take() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                self.refresh_rx = Some(rx);
                return;
            }
            Err(TryRecvError::Disconnected) => Err(WORKER_DISCONNECTED.to_owned()),
        };
        dashboard.apply_refresh(result);
    }
}

impl eframe::App for BubbleApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut reload_requested = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(entities)) => {
                        let dashboard = Dashboard::new(&self.config, entities);
                        transition = Some(AppState::Ready(Box::new(dashboard)));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(WORKER_DISCONNECTED.to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading market snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load market snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.config));
                    }
                });
            }
            AppState::Ready(dashboard) => {
                dashboard.show(ctx, &mut reload_requested, self.refresh_rx.is_some());
            }
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(dashboard) = &mut self.state {
                dashboard.shutdown();
            }
            self.refresh_rx = None;
            self.last_load = Instant::now();
            self.state = next_state;
            return;
        }

        self.poll_refresh(reload_requested);
        if matches!(self.state, AppState::Ready(_)) {
            let wake = if self.refresh_rx.is_some() {
                Duration::from_millis(100)
            } else {
                self.config
                    .refresh_interval
                    .saturating_sub(self.last_load.elapsed())
            };
            ctx.request_repaint_after(wake);
        }
    }
}

impl Drop for BubbleApp {
    fn drop(&mut self) {
        if let AppState::Ready(dashboard) = &mut self.state {
            dashboard.shutdown();
        }
    }
}

impl Dashboard {
    fn new(config: &AppConfig, entities: Vec<MarketEntity>) -> Self {
        let badges = match &config.images {
            Some(dir) => BadgeCache::new(Arc::new(LocalImageResolver::new(dir))),
            None => BadgeCache::disabled(),
        };
        tracing::info!(entities = entities.len(), "market snapshot ready");

        Self {
            entities,
            data_revision: 0,
            view_model: ViewModel {
                mode: config.mode,
                timeframe: config.timeframe,
                search_query: String::new(),
                pop_mode_active: false,
                max_count: config.max_count,
            },
            auto_trim: config.auto_trim,
            built: None,
            chart: BubbleChart::new(Box::new(FixedStepScheduler::new(TICK_RATE_HZ))),
            chart_origin: Pos2::ZERO,
            pointer_inside: false,
            badges,
            frame_stats: FrameStats::default(),
            status: None,
        }
    }

    fn apply_refresh(&mut self, result: LoadResult) {
        match result {
            Ok(entities) => {
                tracing::info!(entities = entities.len(), "market snapshot refreshed");
                self.entities = entities;
                self.data_revision = self.data_revision.wrapping_add(1);
                self.status = None;
            }
            Err(error) => {
                tracing::warn!(%error, "market refresh failed, keeping last snapshot");
                self.status = Some(format!("Refresh failed: {error}"));
            }
        }
    }

    fn build_key(&self) -> BuildKey {
        BuildKey {
            data_revision: self.data_revision,
            mode: self.view_model.mode,
            timeframe: self.view_model.timeframe,
            search_query: self.view_model.search_query.trim().to_owned(),
            max_count: self.view_model.max_count,
        }
    }

    fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_reloading: bool) {
        self.frame_stats.record(ctx);
        self.badges.poll(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                self.draw_controls(ui, reload_requested, is_reloading)
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.draw_chart(ui));

        self.draw_tooltip(ctx);
    }

    fn shutdown(&mut self) {
        self.chart.shutdown();
        self.badges.shutdown();
    }
}
