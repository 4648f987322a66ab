use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Paragraph,
};
use ratatui_image::picker::Picker;
use std::{collections::VecDeque, io, sync::Arc, time::Duration};

use crate::animator::{AnimEvent, DockIconAnimator, MultiAnimationDriver, Services};
use crate::components::Component;
use crate::components::dock_icon::DockPane;
use crate::components::logs::LogsState;
use crate::components::preview::{PaneRegistry, PaneSurface, PreviewPane};
use crate::config::{Config, DockConfig, SequenceConfig};
use crate::event::AppMsg;
use crate::model::catalog;
use crate::model::sequence::FrameSequence;
use crate::services::{ImageCache, ImageLookup, MainQueue, MainQueueRunner, PeriodicTimer, ThreadTimer};
use crate::surface::{BufferIconSurface, Placement};
use crate::widgets::theme::get_theme;

pub struct App {
    pub config: Config,
    picker: Picker,
    tx: Sender<AppMsg>,
    rx: Receiver<AppMsg>,
}

/// Everything wired up for one run: drivers, the queue their display work
/// lands on, and the panes showing their surfaces.
struct Session {
    multi: MultiAnimationDriver,
    dock: Option<&'static DockIconAnimator>,
    runner: MainQueueRunner,
    events: Receiver<AnimEvent>,
    panes: Vec<PreviewPane>,
    dock_pane: DockPane,
    logs: LogsState,
    cached: usize,
}

impl App {
    pub fn new_with_picker(config: Config, picker: Picker, tx: Sender<AppMsg>, rx: Receiver<AppMsg>) -> Self {
        Self {
            config,
            picker,
            tx,
            rx,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        // Build before touching the terminal so setup errors print normally
        let mut session = Session::build(&self.config, &self.picker)?;
        log::info!(
            "{} sequences ready, {} frames cached",
            session.multi.len(),
            session.cached
        );

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let res = self.event_loop(&mut terminal, &mut session);

        session.multi.stop();
        if let Some(dock) = session.dock {
            dock.stop();
        }

        restore_terminal(&mut terminal)?;
        res
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        session: &mut Session,
    ) -> Result<()> {
        let tick_rate = Duration::from_millis(16);

        loop {
            session.runner.drain();

            let mut queue: VecDeque<AppMsg> = session.events.try_iter().map(AppMsg::from).collect();
            queue.extend(self.rx.try_iter());
            queue.push_back(AppMsg::Tick);

            while let Some(msg) = queue.pop_front() {
                if let AppMsg::Quit = msg {
                    return Ok(());
                }
                if let Some(next) = session.update(&msg) {
                    queue.push_back(next);
                }
            }

            terminal.draw(|f| session.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    let msg = match key_action(&key) {
                        Some(action) => action,
                        None => AppMsg::Key(key),
                    };
                    let _ = self.tx.send(msg);
                }
            }
        }
    }
}

fn key_action(key: &KeyEvent) -> Option<AppMsg> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => Some(AppMsg::Quit),
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(AppMsg::Quit),
        (KeyCode::Char(' '), _) => Some(AppMsg::ToggleSequences),
        (KeyCode::Char('d'), _) => Some(AppMsg::ToggleDock),
        _ => None,
    }
}

impl Session {
    fn build(config: &Config, picker: &Picker) -> Result<Self> {
        let frames_dir = config.scan_dir();
        let cache = Arc::new(
            ImageCache::new()
                .with_root(frames_dir)
                .with_extension(config.extension()),
        );

        let names = catalog::frame_names(frames_dir, config.extension())
            .with_context(|| format!("Failed to scan {}", frames_dir.display()))?;
        let cached = if config.preload {
            cache.preload(&names)
        } else {
            0
        };

        let sequences = if config.sequences.is_empty() {
            catalog::group_sequences(&names)
        } else {
            config.sequences.clone()
        };
        if sequences.is_empty() {
            anyhow::bail!("No numbered frames found in {}", frames_dir.display());
        }

        let timer: Arc<dyn PeriodicTimer> = Arc::new(ThreadTimer::new());
        let (main_queue, runner) = MainQueue::new();
        let (event_tx, events) = unbounded();
        let services = Services::new(cache.clone(), Arc::clone(&timer))
            .with_display(Arc::new(main_queue))
            .with_events(event_tx);

        let registry = PaneRegistry::default();
        let surface = Arc::new(PaneSurface::new(Placement::default(), registry.clone()));
        let multi = MultiAnimationDriver::from_sequences(
            surface,
            &sequences,
            &config.animation,
            services,
            false,
        )?;

        let panes = registry
            .buffers()
            .into_iter()
            .zip(multi.drivers())
            .map(|(buffer, driver)| {
                PreviewPane::new(driver.label(), driver.frame_count(), buffer, picker.clone())
            })
            .collect();

        let icon = Arc::new(BufferIconSurface::new());
        let dock_config = config
            .dock
            .clone()
            .unwrap_or_else(|| dock_from_sequence(&sequences[0]));
        let dock = build_dock(&dock_config, icon.clone(), cache, timer)?;

        Ok(Self {
            multi,
            dock,
            runner,
            events,
            panes,
            dock_pane: DockPane::new(icon, picker.clone()),
            logs: LogsState::default(),
            cached,
        })
    }

    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::ToggleSequences => {
                if self.multi.is_running() {
                    self.multi.stop();
                } else if let Err(e) = self.multi.start() {
                    return Some(AppMsg::ErrorOccurred(format!("Cannot start sequences: {}", e)));
                }
                for pane in &mut self.panes {
                    pane.set_playing(self.multi.is_running());
                }
            }
            AppMsg::ToggleDock => {
                let Some(dock) = self.dock else {
                    return Some(AppMsg::ErrorOccurred("No dock frames found".to_string()));
                };
                if dock.is_running() {
                    dock.stop();
                } else if let Err(e) = dock.start() {
                    return Some(AppMsg::ErrorOccurred(format!("Cannot start dock: {}", e)));
                }
                self.dock_pane.playing = dock.is_running();
            }
            AppMsg::Tick => {
                for (pane, driver) in self.panes.iter_mut().zip(self.multi.drivers()) {
                    pane.playing = driver.is_running();
                }
            }
            _ => {}
        }

        for pane in &mut self.panes {
            pane.update(msg);
        }
        self.dock_pane.update(msg);
        self.logs.update(msg)
    }

    fn render(&mut self, f: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(28)])
            .split(chunks[0]);

        let count = self.panes.len().max(1) as u32;
        let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
        let pane_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(body[0]);

        let buf = f.buffer_mut();
        for (pane, area) in self.panes.iter_mut().zip(pane_areas.iter()) {
            pane.render(*area, buf, false);
        }
        self.dock_pane.render(body[1], buf, false);
        self.logs.render(chunks[1], buf, true);

        let status = Paragraph::new(format!(
            "space: play/stop sequences  d: dock  ↑/↓: scroll logs  q: quit  |  {} sequences, {} frames cached",
            self.multi.len(),
            self.cached
        ))
        .style(Style::default().fg(get_theme().text_secondary));
        f.render_widget(status, chunks[2]);
    }
}

fn dock_from_sequence(sequence: &SequenceConfig) -> DockConfig {
    DockConfig {
        prefix: sequence.prefix.clone(),
        start: sequence.start,
        padding: sequence.padding,
        ..DockConfig::default()
    }
}

/// Installs the process-wide dock animator, or returns `None` when the
/// configured prefix matches no frames.
fn build_dock(
    config: &DockConfig,
    icon: Arc<BufferIconSurface>,
    cache: Arc<ImageCache>,
    timer: Arc<dyn PeriodicTimer>,
) -> Result<Option<&'static DockIconAnimator>> {
    let animator = DockIconAnimator::new(icon, cache.clone(), timer);
    match config.end {
        Some(end) => animator.add_batch_ids(&config.prefix, config.start, end, config.padding)?,
        None => {
            let mut discovered = FrameSequence::new();
            discovered.auto_add_ids(&config.prefix, config.start, config.padding, |name| {
                cache.image_named(name).is_some()
            });
            for id in discovered.ids() {
                animator.add_id(id.clone());
            }
        }
    }
    if animator.ids().is_empty() {
        log::warn!("Dock prefix '{}' matched no frames", config.prefix);
        return Ok(None);
    }
    animator.set_interval(Duration::from_millis(config.interval_ms))?;
    Ok(Some(animator.install_shared()?))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().ok();
    // LeaveAlternateScreen must be executed on the same stdout the backend uses
    let mut out = io::stdout();
    execute!(out, LeaveAlternateScreen)?;
    Ok(())
}
