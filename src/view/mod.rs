//! Terminal front-end (impure shell)
//!
//! Drives a [`DiagramView`] backed by a [`RecordingBackend`] and rasterises
//! the recorded scene into the terminal every frame. Pointer and key events
//! are translated into the view's gestures; animation timers come from a
//! [`SystemScheduler`] polled by the event loop.

mod canvas;
pub mod constants;
mod styles;

pub use canvas::{fit_to_width, render_scene, CellMetrics, SceneWidget};
pub use styles::{parse_hex, ColorConfig, SceneStyles};

use crate::config::ResolvedConfig;
use crate::controller::{DiagramView, PointerEvent};
use crate::layout::NodeCommand;
use crate::logging::StatusEntry;
use crate::model::{NodeId, Point, Size, SourceNode, ViewError};
use crate::scene::{RecordingBackend, Scene};
use crate::store::{AutoPanToSelected, SelectedNode, SetOptions, SharedState};
use crate::view_state::{ManualScheduler, SystemScheduler};
use constants::{
    ARROW_PAN_FRACTION, DOUBLE_CLICK_WINDOW, IDLE_POLL_INTERVAL, STATUS_BAR_HEIGHT,
    WHEEL_PAN_CELLS,
};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Diagram view error
    #[error("View error: {0}")]
    View(#[from] ViewError),
}

/// Settings carried from the command line into the front-end.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Node selected on startup; the camera follows it.
    pub selection: Option<NodeId>,
    /// Colors of the rasterised scene.
    pub styles: SceneStyles,
    /// Warnings forwarded from the logging layer.
    pub status: Option<Receiver<StatusEntry>>,
}

/// An in-progress left-button gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start: Point,
    last: (u16, u16),
    moved: bool,
}

/// The last plain click, for double-click detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClickRecord {
    at: Instant,
    cell: (u16, u16),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    view: DiagramView<RecordingBackend>,
    scene: RecordingBackend,
    scheduler: Rc<SystemScheduler>,
    cell: CellMetrics,
    styles: SceneStyles,
    drag: Option<DragState>,
    last_click: Option<ClickRecord>,
    status: Option<StatusEntry>,
    status_rx: Option<Receiver<StatusEntry>>,
    hover: Option<String>,
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the view for `document` and size it to the terminal.
    ///
    /// # Errors
    ///
    /// Terminal size queries and view setup failures.
    pub fn new(
        terminal: Terminal<B>,
        document: &SourceNode,
        config: &ResolvedConfig,
        options: RunOptions,
    ) -> Result<Self, TuiError> {
        let size = terminal.size()?;
        let cell = config.cell;
        let scene = RecordingBackend::new(diagram_surface(cell, size.width, size.height));
        let store = Rc::new(SharedState::new());
        let scheduler = Rc::new(SystemScheduler::new());
        let view = DiagramView::new(
            scene.clone(),
            store,
            scheduler.clone(),
            config.view_options(),
        );
        view.setup()?;
        view.accept_source_data(document)?;

        if let Some(selection) = options.selection {
            view.store()
                .set::<SelectedNode>(Some(selection), SetOptions::default());
            view.enable_auto_pan()?;
        }

        Ok(Self {
            terminal,
            view,
            scene,
            scheduler,
            cell,
            styles: options.styles,
            drag: None,
            last_click: None,
            status: None,
            status_rx: options.status,
            hover: None,
        })
    }

    /// Run the main event loop
    ///
    /// Returns when user quits (q or Ctrl+C). Redraws after input, resize and
    /// animation ticks; sleeps until the next timer otherwise.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let timeout = self
                .scheduler
                .next_deadline()
                .map_or(IDLE_POLL_INTERVAL, |due| due.min(IDLE_POLL_INTERVAL));

            let mut dirty = false;
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key)? {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        self.handle_mouse(mouse, Instant::now())?;
                        dirty = true;
                    }
                    Event::Resize(width, height) => {
                        self.handle_resize(width, height)?;
                        dirty = true;
                    }
                    _ => {}
                }
            }

            dirty |= self.fire_due_timers()?;
            dirty |= self.poll_status();
            if dirty {
                self.draw()?;
            }
        }
    }

    /// Feed due animation timers to the view. Returns whether any fired.
    fn fire_due_timers(&mut self) -> Result<bool, TuiError> {
        let due = self.scheduler.due();
        for id in &due {
            self.view.on_timer(*id)?;
        }
        Ok(!due.is_empty())
    }

    /// Take the newest forwarded log event. Returns whether one arrived.
    fn poll_status(&mut self) -> bool {
        let Some(rx) = &self.status_rx else {
            return false;
        };
        match rx.try_iter().last() {
            Some(entry) => {
                self.status = Some(entry);
                true
            }
            None => false,
        }
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool, TuiError> {
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        let viewport = self.view.controller().camera().size();
        let step_x = viewport.width * ARROW_PAN_FRACTION;
        let step_y = viewport.height * ARROW_PAN_FRACTION;

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('a') => self.view.enable_auto_pan()?,
            KeyCode::Char('e') => {
                let selected = self.view.controller().selected().cloned();
                if let Some(id) = selected {
                    self.view.dispatch(&NodeCommand::ToggleExpand(id))?;
                }
            }
            KeyCode::Esc => {
                self.view
                    .store()
                    .set::<SelectedNode>(None, SetOptions::default());
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.view.user_pan_to(Point::ZERO, false)?;
            }
            KeyCode::Left => self.wheel(-step_x, 0.0)?,
            KeyCode::Right => self.wheel(step_x, 0.0)?,
            KeyCode::Up => self.wheel(0.0, -step_y)?,
            KeyCode::Down => self.wheel(0.0, step_y)?,
            _ => {}
        }
        Ok(false)
    }

    fn wheel(&self, dx: f64, dy: f64) -> Result<(), TuiError> {
        self.view.handle_pointer(PointerEvent::Wheel { dx, dy })?;
        Ok(())
    }

    /// Handle a single mouse event
    ///
    /// Left press starts a gesture; motion with the button held pans, release
    /// without motion clicks. A second click on the same cell within
    /// [`DOUBLE_CLICK_WINDOW`] is delivered as a double click instead.
    /// Plain motion updates the hovered flag or marker shown in the status
    /// bar. Events on the status bar are ignored.
    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Result<(), TuiError> {
        let diagram_rows = self.diagram_rows()?;
        if mouse.row >= diagram_rows {
            self.hover = None;
            return Ok(());
        }
        let cell = (mouse.column, mouse.row);
        let point = self.cell.cell_center(mouse.column, mouse.row);
        let horizontal = mouse.modifiers.contains(KeyModifiers::SHIFT);
        let notch = WHEEL_PAN_CELLS;

        match mouse.kind {
            MouseEventKind::ScrollUp if horizontal => self.wheel(-notch * self.cell.cell_width, 0.0)?,
            MouseEventKind::ScrollDown if horizontal => self.wheel(notch * self.cell.cell_width, 0.0)?,
            MouseEventKind::ScrollUp => self.wheel(0.0, -notch * self.cell.cell_height)?,
            MouseEventKind::ScrollDown => self.wheel(0.0, notch * self.cell.cell_height)?,
            MouseEventKind::ScrollLeft => self.wheel(-notch * self.cell.cell_width, 0.0)?,
            MouseEventKind::ScrollRight => self.wheel(notch * self.cell.cell_width, 0.0)?,
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = Some(DragState {
                    start: point,
                    last: cell,
                    moved: false,
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = self.drag.as_mut() else {
                    return Ok(());
                };
                let dx = (f64::from(cell.0) - f64::from(drag.last.0)) * self.cell.cell_width;
                let dy = (f64::from(cell.1) - f64::from(drag.last.1)) * self.cell.cell_height;
                drag.last = cell;
                if dx == 0.0 && dy == 0.0 {
                    return Ok(());
                }
                drag.moved = true;
                let start = drag.start;
                self.view
                    .handle_pointer(PointerEvent::Drag { start, dx, dy })?;
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(drag) = self.drag.take() else {
                    return Ok(());
                };
                if !drag.moved {
                    self.click(cell, point, now)?;
                }
            }
            MouseEventKind::Moved => {
                self.hover = self.view.controller().hover_label(point);
            }
            _ => {}
        }
        Ok(())
    }

    fn click(&mut self, cell: (u16, u16), point: Point, now: Instant) -> Result<(), TuiError> {
        let is_double = self.last_click.is_some_and(|last| {
            last.cell == cell && now.saturating_duration_since(last.at) <= DOUBLE_CLICK_WINDOW
        });
        if is_double {
            self.last_click = None;
            debug!(?cell, "double click");
            self.view.handle_pointer(PointerEvent::DoubleClick(point))?;
        } else {
            self.last_click = Some(ClickRecord { at: now, cell });
            self.view.handle_pointer(PointerEvent::Click(point))?;
        }
        Ok(())
    }

    /// Handle a terminal resize event
    ///
    /// Re-measures the diagram surface; the camera re-clamps its position.
    fn handle_resize(&mut self, width: u16, height: u16) -> Result<(), TuiError> {
        debug!("Handling resize to {}x{}", width, height);
        self.scene
            .set_surface_size(diagram_surface(self.cell, width, height));
        self.view.on_resize()?;
        Ok(())
    }

    fn diagram_rows(&self) -> Result<u16, TuiError> {
        Ok(self.terminal.size()?.height.saturating_sub(STATUS_BAR_HEIGHT))
    }

    /// Status bar text: selection, auto-pan state, key hints and the hovered
    /// flag or marker.
    fn status_line(&self) -> Line<'static> {
        let selected = self
            .view
            .controller()
            .selected()
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let auto_pan = if self.view.store().get::<AutoPanToSelected>() {
            "on"
        } else {
            "off"
        };
        let mut spans = vec![Span::styled(
            format!(" selected: {selected} | auto-pan: {auto_pan} | a:follow e:expand esc:clear q:quit "),
            self.styles.status,
        )];
        if let Some(hover) = &self.hover {
            spans.push(Span::styled(format!(" {hover} "), self.styles.status));
        }
        if let Some(entry) = &self.status {
            spans.push(Span::styled(format!(" {entry} "), self.styles.status_alert));
        }
        Line::from(spans)
    }

    /// Render the current frame
    fn draw(&mut self) -> Result<(), TuiError> {
        let status = self.status_line();
        let scene = self.scene.scene();
        let widget = SceneWidget::new(&scene, self.cell).styles(self.styles);
        self.terminal.draw(|frame| {
            let [diagram, bar] = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(STATUS_BAR_HEIGHT),
            ])
            .areas(frame.area());
            frame.render_widget(widget, diagram);
            frame.render_widget(Paragraph::new(status).style(self.styles.status), bar);
        })?;
        Ok(())
    }
}

/// Surface size of the diagram area of a `width` x `height` terminal.
fn diagram_surface(cell: CellMetrics, width: u16, height: u16) -> Size {
    cell.surface_size(width.max(1), height.saturating_sub(STATUS_BAR_HEIGHT).max(1))
}

/// Build the view headlessly and return the recorded scene.
///
/// Used by `--dump`: nothing is drawn, the scene is what a renderer would
/// receive for a surface of `size`.
///
/// # Errors
///
/// View setup and layout failures.
pub fn build_scene(
    document: &SourceNode,
    config: &ResolvedConfig,
    size: Size,
    selection: Option<NodeId>,
) -> Result<Scene, ViewError> {
    let backend = RecordingBackend::new(size);
    let store = Rc::new(SharedState::new());
    store.set::<SelectedNode>(selection, SetOptions::default());
    let view = DiagramView::new(
        backend.clone(),
        store,
        Rc::new(ManualScheduler::new()),
        config.view_options(),
    );
    view.setup()?;
    view.accept_source_data(document)?;
    if view.controller().selected().is_some() {
        // centre the selection without animating
        view.enable_auto_pan()?;
        let target = view.controller().camera().target();
        if let Some(target) = target {
            view.pan_to(target, true)?;
        }
    }
    Ok(backend.snapshot())
}

/// Initialize and run the TUI application
///
/// Handles terminal setup, runs the event loop, and restores the terminal
/// even when the loop fails.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run(
    document: &SourceNode,
    config: &ResolvedConfig,
    options: RunOptions,
) -> Result<(), TuiError> {
    let terminal = enter_terminal()?;
    let result =
        TuiApp::new(terminal, document, config, options).and_then(|mut app| app.run());
    restore_terminal()?;
    result
}

/// Raw mode, alternate screen and mouse capture.
fn enter_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(crossterm::event::EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(crossterm::event::DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;
