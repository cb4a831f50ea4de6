// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main application setup and event loop.

use crate::dataset::{DatasetError, DatasetSource};
use crate::file_watcher::{DatasetWatcher, DatasetWatcherConfig};
use crate::graphics::Graphics;
use crate::icons::IconCache;
use crate::settings::AppSettings;
use craftflow_graph::{ChainView, DomainGraph, InteractionController};
use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Initial dataset could not be loaded
    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] DatasetError),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Chain view plus everything feeding it
struct ExplorerState {
    view: ChainView,
    icons: IconCache,
    source: DatasetSource,
    watcher: Option<DatasetWatcher>,
    /// Last reload failure, shown in the top bar
    last_error: Option<String>,
}

impl ExplorerState {
    fn new(settings: &AppSettings, source: DatasetSource, domain: Arc<DomainGraph>) -> Self {
        let controller = InteractionController::new(domain, settings.layout)
            .with_default_transformation(settings.default_transformation.clone());

        let watcher = match source.path() {
            Some(path) if settings.watch_dataset => Self::start_watcher(path),
            _ => None,
        };

        Self {
            view: ChainView::new(controller),
            icons: IconCache::new(source.base_dir()),
            source,
            watcher,
            last_error: None,
        }
    }

    fn start_watcher(path: &std::path::Path) -> Option<DatasetWatcher> {
        let mut watcher = match DatasetWatcher::new(DatasetWatcherConfig::default()) {
            Ok(watcher) => watcher,
            Err(e) => {
                tracing::warn!("Dataset hot reload unavailable: {e}");
                return None;
            }
        };
        if let Err(e) = watcher.watch(path) {
            tracing::warn!("Failed to watch dataset {:?}: {e}", path);
            return None;
        }
        Some(watcher)
    }

    /// Reload the dataset and start over. The current domain stays on failure.
    fn reload(&mut self) {
        match self.source.load() {
            Ok(domain) => {
                self.icons.set_base_dir(self.source.base_dir());
                self.view.set_domain(Arc::new(domain));
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!("Failed to reload dataset: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn update(&mut self, ctx: &egui::Context) {
        if self.watcher.as_ref().is_some_and(DatasetWatcher::take_changed) {
            self.reload();
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Reset view").clicked() {
                    self.view.reset();
                }
                if ui.button("Reload dataset").clicked() {
                    self.reload();
                }
                ui.separator();
                ui.label(self.source.label());
                if self.watcher.is_some() {
                    ui.weak("(watching)");
                }
                if let Some(error) = &self.last_error {
                    ui.colored_label(egui::Color32::from_rgb(230, 100, 90), error);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.view.ui(ui, &mut self.icons);
            });
    }
}

/// Running state of the application
struct AppRunning {
    window: Arc<Window>,
    graphics: Graphics,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    explorer: ExplorerState,
}

/// Main application
pub struct CraftflowApp {
    settings: AppSettings,
    source: DatasetSource,
    /// Domain loaded at startup, handed to the explorer on first resume
    domain: Arc<DomainGraph>,
    running: Option<AppRunning>,
}

impl CraftflowApp {
    /// Create the application, loading the initial dataset
    pub fn new(settings: AppSettings, source: DatasetSource) -> Result<Self> {
        let domain = Arc::new(source.load()?);
        Ok(Self {
            settings,
            source,
            domain,
            running: None,
        })
    }

    /// Run the application until its window closes
    pub fn run(settings: AppSettings, source: DatasetSource) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = CraftflowApp::new(settings, source)?;
        event_loop.run_app(&mut app)?;

        Ok(())
    }
}

impl ApplicationHandler for CraftflowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating window...");

        let window_attrs = Window::default_attributes()
            .with_title(self.settings.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.settings.window.width,
                self.settings.window.height,
            ))
            .with_min_inner_size(winit::dpi::LogicalSize::new(480, 320));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let graphics = match Graphics::new(window.clone()) {
            Ok(graphics) => graphics,
            Err(e) => {
                tracing::error!("Failed to set up graphics: {e}");
                event_loop.exit();
                return;
            }
        };

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024),
        );

        let explorer = ExplorerState::new(&self.settings, self.source.clone(), Arc::clone(&self.domain));

        tracing::info!("Window size: {:?}", window.inner_size());

        self.running = Some(AppRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            explorer,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);

        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    running.explorer.update(ctx);
                });

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                let size = running.window.inner_size();
                if let Err(e) = running.graphics.present(&running.egui_ctx, full_output, size) {
                    tracing::error!("Rendering failed: {e}");
                    event_loop.exit();
                    return;
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
