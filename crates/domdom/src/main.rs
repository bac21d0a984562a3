use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use domdom_config::Config;
use domdom_core::{InputEvent, Viewport};
use domdom_effects::{
    Coordinator, EffectContext, EffectRegistry, InputHub, Selector, SurfaceHandle,
    register_builtin,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load();
    let terminal = ratatui::init();
    if config.mouse {
        execute!(io::stdout(), EnableMouseCapture)?;
    }
    let result = run(terminal, &config);
    if config.mouse {
        let _ = execute!(io::stdout(), DisableMouseCapture);
    }
    ratatui::restore();
    result
}

fn run(terminal: DefaultTerminal, config: &Config) -> color_eyre::Result<()> {
    let size = terminal.size()?;
    App::new(config, size.width, size.height).run(terminal)
}

/// The main application which holds the state and logic of the application.
pub struct App {
    /// Is the application running?
    running: bool,
    frame_ms: u64,
    started: Instant,
    surface: SurfaceHandle,
    coordinator: Coordinator,
    selector: Selector,
}

impl App {
    /// Construct the engine against the current terminal size.
    pub fn new(config: &Config, cols: u16, rows: u16) -> Self {
        let surface = SurfaceHandle::sized(cols, canvas_rows(rows));
        let hub = InputHub::new();
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry);
        let ctx = EffectContext::new(surface.clone(), hub);
        let mut coordinator = Coordinator::new(registry, ctx);
        let selector = Selector::init(
            &mut coordinator,
            Local::now().date_naive(),
            config.effect.as_deref(),
        );
        if !config.enabled {
            selector.turn_off(&mut coordinator);
        }
        Self {
            running: false,
            frame_ms: config.frame_ms(),
            started: Instant::now(),
            surface,
            coordinator,
            selector,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            self.coordinator.tick(self.now_ms());
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Effect canvas
            Constraint::Length(1), // Help text
        ])
        .split(frame.area());

        self.render_canvas(frame, chunks[0]);
        self.render_help(frame, chunks[1]);
    }

    fn render_canvas(&self, frame: &mut Frame, area: Rect) {
        if let Some(lines) = self.surface.with(|s| s.render_lines()) {
            frame.render_widget(Paragraph::new(lines), area);
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let icon = self.selector.icon(&self.coordinator).to_string();
        let help = Line::from(vec![
            icon.magenta(),
            "  ".into(),
            "e".bold().magenta(),
            " next  ".dark_gray(),
            "x".bold().magenta(),
            " off  ".dark_gray(),
            "o".bold().magenta(),
            " on  ".dark_gray(),
            "q".bold().magenta(),
            " quit".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, area);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Uses polling with a frame-length timeout so the animation keeps
    /// moving while no input arrives. Mouse capture queues motion events
    /// faster than one per frame, so after the first read the remaining
    /// backlog is drained; otherwise pointer state lags the host.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if !event::poll(Duration::from_millis(self.frame_ms))? {
            return Ok(());
        }
        self.on_event(event::read()?);
        while event::poll(Duration::ZERO)? {
            self.on_event(event::read()?);
        }
        Ok(())
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(mouse) => self.on_mouse_event(mouse),
            Event::Resize(cols, rows) => self.on_resize(cols, rows),
            Event::FocusLost => self.coordinator.dispatch(&InputEvent::PointerLeft),
            _ => {}
        }
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('e') | KeyCode::Char(' ')) => {
                self.selector.next(&mut self.coordinator);
            }
            (_, KeyCode::Char('x')) => self.selector.turn_off(&mut self.coordinator),
            (_, KeyCode::Char('o')) => self.selector.turn_on(&mut self.coordinator),
            _ => {}
        }
    }

    /// Forward mouse motion and clicks in surface pixel coordinates.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        let x = f32::from(mouse.column);
        let y = f32::from(mouse.row) * 2.0;
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.coordinator.dispatch(&InputEvent::PointerMoved { x, y });
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.coordinator.dispatch(&InputEvent::Clicked { x, y });
            }
            _ => {}
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) {
        let rows = canvas_rows(rows);
        self.surface.resize(cols, rows);
        self.coordinator
            .dispatch(&InputEvent::Resized(Viewport::from_cells(cols, rows)));
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// One terminal row is reserved for the help line.
fn canvas_rows(rows: u16) -> u16 {
    rows.saturating_sub(1).max(1)
}
