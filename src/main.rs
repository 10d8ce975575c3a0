use arboard::Clipboard;
use macroquad::prelude::{
    clear_background, draw_circle, draw_rectangle, draw_text, get_frame_time, is_key_down,
    is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, is_mouse_button_released,
    mouse_position, next_frame, Color, Conf, KeyCode, MouseButton, Rect, WHITE, YELLOW,
};
use pathgrid::config::Config;
use pathgrid::layout::format_layout;
use pathgrid::{
    CellPos, CellVisual, Grid, InteractionError, InteractionMode, Renderer, Session, SessionEvent,
};
use std::time::Duration;

const HUD_HEIGHT: f32 = 150.0;
const MARGIN: f32 = 10.0;
const NOTICE_SECONDS: f32 = 2.5;
const SPEED_STEP_MS: u64 = 10;
const MAX_STEP_DELAY_MS: u64 = 1000;

/// Draws the session's grid with macroquad
struct MacroquadRenderer {
    rows: i32,
    cols: i32,
    cell_size: f32,
    visuals: Vec<CellVisual>,
    token: Option<CellPos>,
    token_visible: bool,
}

impl MacroquadRenderer {
    fn new(rows: i32, cols: i32, cell_size: f32) -> Self {
        MacroquadRenderer {
            rows,
            cols,
            cell_size,
            visuals: vec![CellVisual::Default; rows as usize * cols as usize],
            token: None,
            token_visible: false,
        }
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        if pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols {
            Some(pos.row as usize * self.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    /// Screen rectangle of a cell
    fn cell_rect(&self, pos: CellPos) -> Rect {
        Rect::new(
            MARGIN + pos.col as f32 * self.cell_size,
            MARGIN + pos.row as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Cell under a screen point
    fn cell_at(&self, x: f32, y: f32) -> Option<CellPos> {
        if x < MARGIN || y < MARGIN {
            return None;
        }
        let pos = CellPos::new(
            ((y - MARGIN) / self.cell_size) as i32,
            ((x - MARGIN) / self.cell_size) as i32,
        );
        self.index(pos).map(|_| pos)
    }

    fn draw(&self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = CellPos::new(row, col);
                let rect = self.cell_rect(pos);
                let visual = self.index(pos).map_or(CellVisual::Default, |i| self.visuals[i]);
                draw_rectangle(rect.x, rect.y, rect.w - 1.0, rect.h - 1.0, visual_color(visual));
            }
        }

        if !self.token_visible {
            return;
        }
        if let Some(token) = self.token {
            let rect = self.cell_rect(token);
            draw_circle(
                rect.x + rect.w / 2.0,
                rect.y + rect.h / 2.0,
                self.cell_size * 0.35,
                YELLOW,
            );
        }
    }
}

impl Renderer for MacroquadRenderer {
    fn set_cell_visual(&mut self, pos: CellPos, visual: CellVisual) {
        if let Some(i) = self.index(pos) {
            self.visuals[i] = visual;
        }
    }

    fn set_token_position(&mut self, pos: CellPos) {
        self.token = Some(pos);
    }

    fn set_token_visible(&mut self, visible: bool) {
        self.token_visible = visible;
    }
}

fn visual_color(visual: CellVisual) -> Color {
    match visual {
        CellVisual::Default => Color::from_rgba(60, 60, 60, 255),
        CellVisual::Obstacle => Color::from_rgba(20, 20, 20, 255),
        CellVisual::Open => Color::from_rgba(90, 160, 90, 255),
        CellVisual::Closed => Color::from_rgba(170, 80, 80, 255),
        CellVisual::Path => Color::from_rgba(80, 140, 220, 255),
        CellVisual::Start => Color::from_rgba(60, 90, 220, 255),
        CellVisual::Target => Color::from_rgba(230, 140, 40, 255),
    }
}

/// Short message shown under the grid
struct Notice {
    text: String,
    remaining: f32,
}

fn report(notice: &mut Option<Notice>, result: Result<(), InteractionError>) {
    if let Err(e) = result {
        log::debug!("Interaction rejected: {}", e);
        *notice = Some(Notice {
            text: e.to_string(),
            remaining: NOTICE_SECONDS,
        });
    }
}

fn copy_to_clipboard(session: &Session<MacroquadRenderer>) {
    let start = session.source().or(session.token());
    let layout = format_layout(session.grid(), start, session.target(), &[]);
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(layout) {
                log::warn!("Failed to copy to clipboard: {}", e);
            } else {
                log::info!("Grid layout copied to clipboard");
                // Keep clipboard alive for a moment to ensure clipboard managers can capture it
                std::thread::sleep(Duration::from_millis(100));
            }
        }
        Err(e) => log::warn!("Failed to access clipboard: {}", e),
    }
}

fn draw_hud(session: &Session<MacroquadRenderer>, speed_ms: u64, notice: Option<&Notice>, top: f32) {
    let options = session.options();
    let mode = match options.interaction {
        InteractionMode::FreeMove => "free-move: left click moves the token",
        InteractionMode::FixedEndpoints => "fixed endpoints: left click places source, then target",
    };
    let lines = [
        format!(
            "State: {:?} | {} neighbors | step delay {}ms",
            session.state(),
            options.movement.neighbor_count(),
            speed_ms
        ),
        format!("Mode: {}", mode),
        "Right drag: paint obstacles | Shift+left click: toggle obstacle".to_string(),
        "Enter: run | Backspace: clear | R: random walls | 4/8: neighbors".to_string(),
        "Up/Down: speed | C: copy grid to clipboard | Esc: quit".to_string(),
    ];

    for (i, line) in lines.iter().enumerate() {
        draw_text(line, MARGIN, top + 18.0 + i as f32 * 20.0, 18.0, WHITE);
    }

    if let Some(notice) = notice {
        draw_text(&notice.text, MARGIN, top + 18.0 + lines.len() as f32 * 20.0 + 6.0, 20.0, YELLOW);
    }
}

fn window_conf() -> Conf {
    // Load errors are reported from main once logging is set up
    let (config, _) = Config::load();
    let width = config.grid.cols as f32 * config.grid.cell_size + 2.0 * MARGIN;
    let height = config.grid.rows as f32 * config.grid.cell_size + 2.0 * MARGIN + HUD_HEIGHT;
    Conf {
        window_title: config.visual.window_title,
        window_width: width.max(520.0) as i32,
        window_height: height as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let (config, load_error) = Config::load();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();
    Config::report_load(load_error.as_ref());
    log::info!(
        "Grid {}x{}, {:?}, {:?}",
        config.grid.rows,
        config.grid.cols,
        config.interaction.mode,
        config.search.movement
    );

    let renderer = MacroquadRenderer::new(config.grid.rows, config.grid.cols, config.grid.cell_size);
    let grid = Grid::new(config.grid.rows, config.grid.cols);
    let mut session = Session::new(grid, config.session_options(), renderer);

    let mut rng = ::rand::rng();
    if let Ok(Some(pos)) = session.place_token_at_random(&mut rng) {
        log::info!("Token placed at {}", pos);
    }

    let background = Color::from_rgba(
        config.visual.background_r,
        config.visual.background_g,
        config.visual.background_b,
        255,
    );
    let hud_top = MARGIN * 2.0 + config.grid.rows as f32 * config.grid.cell_size;
    let mut speed_ms = config.search.step_delay_ms;
    let mut notice: Option<Notice> = None;

    loop {
        let frame_time = get_frame_time();
        let (mouse_x, mouse_y) = mouse_position();
        let hovered = session.renderer().cell_at(mouse_x, mouse_y);

        if is_mouse_button_pressed(MouseButton::Left) {
            if let Some(pos) = hovered {
                let toggle = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
                let result = if toggle {
                    session.secondary_activate(pos)
                } else {
                    session.primary_activate(pos)
                };
                report(&mut notice, result);
            }
        }

        if is_mouse_button_pressed(MouseButton::Right) {
            if let Some(pos) = hovered {
                report(&mut notice, session.drag_start(pos));
            }
        } else if is_mouse_button_down(MouseButton::Right) {
            if let Some(pos) = hovered {
                session.drag_over(pos);
            }
        }
        if is_mouse_button_released(MouseButton::Right) {
            session.drag_end();
        }

        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space) {
            report(&mut notice, session.run_requested());
        }
        if is_key_pressed(KeyCode::Backspace) || is_key_pressed(KeyCode::Delete) {
            report(&mut notice, session.clear_requested());
        }
        if is_key_pressed(KeyCode::R) {
            let probability = config.randomize.obstacle_probability;
            report(&mut notice, session.randomize_requested(probability, &mut rng));
        }
        if is_key_pressed(KeyCode::Key4) {
            report(&mut notice, session.mode_changed(4));
        }
        if is_key_pressed(KeyCode::Key8) {
            report(&mut notice, session.mode_changed(8));
        }
        if is_key_pressed(KeyCode::Up) {
            speed_ms = speed_ms.saturating_sub(SPEED_STEP_MS);
            session.speed_changed(speed_ms);
        }
        if is_key_pressed(KeyCode::Down) {
            speed_ms = (speed_ms + SPEED_STEP_MS).min(MAX_STEP_DELAY_MS);
            session.speed_changed(speed_ms);
        }
        if is_key_pressed(KeyCode::C) {
            copy_to_clipboard(&session);
        }
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        match session.update(Duration::from_secs_f32(frame_time)) {
            Some(SessionEvent::PathNotFound { .. }) => {
                notice = Some(Notice {
                    text: "No route found!".to_string(),
                    remaining: NOTICE_SECONDS,
                });
            }
            Some(SessionEvent::Arrived(_)) | None => {}
        }

        if let Some(current) = notice.as_mut() {
            current.remaining -= frame_time;
            if current.remaining <= 0.0 {
                notice = None;
            }
        }

        clear_background(background);
        session.renderer().draw();
        draw_hud(&session, speed_ms, notice.as_ref(), hud_top);

        next_frame().await
    }

    log::info!("{}", session.action_log().summary().replace('\n', " | "));
    if config.logging.enable_action_log {
        match session.action_log().save_to_file(&config.logging.action_log_path) {
            Ok(()) => log::info!("Action log saved to {}", config.logging.action_log_path),
            Err(e) => log::warn!("Failed to save action log: {}", e),
        }
    }
}
