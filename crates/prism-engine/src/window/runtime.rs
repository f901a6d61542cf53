use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::RenderConfig;
use crate::context::{FrameStatus, RenderContext};
use crate::time::{FrameClock, FrameStats};

use super::cadence::RenderCadence;

/// Frames between two statistics lines.
const STATS_INTERVAL: u64 = 600;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs the startup sequence and renders until the
    /// window closes.
    ///
    /// Startup failures are returned after the event loop has shut down; the
    /// window is never shown in that case.
    pub fn run(config: RenderConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    stats: FrameStats,

    window: Window,

    #[borrows(window)]
    #[covariant]
    context: RenderContext<'this>,
}

struct AppState {
    config: RenderConfig,
    cadence: RenderCadence,
    entry: Option<WindowEntry>,
    startup_error: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RenderConfig) -> Self {
        Self {
            config,
            cadence: RenderCadence::new(),
            entry: None,
            startup_error: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false)
            .with_visible(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let config = &self.config;
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            stats: FrameStats::default(),
            window,
            context_builder: |w| RenderContext::new(w, config),
        }
        .try_build()
        .context("render pipeline startup failed")?;

        Ok(entry)
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.cadence.quit();
        event_loop.exit();
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        let (status, report) = entry.with_mut(|fields| {
            let status = fields.context.render_frame();
            let ft = fields.clock.tick();
            if status == FrameStatus::Presented {
                fields.stats.record(ft.dt);
            }
            (status, fields.stats.take_report(STATS_INTERVAL))
        });

        if let Some(report) = report {
            log::debug!(
                "{} frames, {:.3} ms average, {} messages dispatched",
                report.frames,
                report.average_frame_ms,
                self.cadence.take_messages()
            );
        }

        if status == FrameStatus::Fatal {
            self.quit(event_loop);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.cadence.is_exited() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.set_visible(true));
                self.entry = Some(entry);
                event_loop.set_control_flow(ControlFlow::Poll);
            }
            Err(err) => {
                log::error!("{err:#}");
                self.startup_error = Some(err);
                self.quit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.cadence.on_idle() {
            self.render(event_loop);
        } else {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.cadence.on_message() {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                log::info!("window closed");
                self.quit(event_loop);
            }
            // Frames are produced on idle ticks; paint requests need no work.
            WindowEvent::RedrawRequested => {}
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Context first, then the window it borrows.
        self.entry = None;
    }
}
