/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Each world tile maps to 2 terminal columns by 1 row. The body lives in
/// continuous pixel space; it is drawn over the tile cells it overlaps.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::body::Facing;
use crate::sim::world::{ControlMode, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// both Clear and cell backgrounds so inter-row gap pixels match.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 22, b: 40 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from every
    /// real cell, so every position gets diff'd on the next frame.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each world tile = 2 terminal columns, so tiles look roughly square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Viewport from terminal size: HUD + gap above, msg + help below
        let reserved_rows = MAP_ROW + 4;
        world.camera.view_w = (self.term_w / CELL_W).min(world.world.width());
        world.camera.view_h = if self.term_h > reserved_rows {
            (self.term_h - reserved_rows).min(world.world.height())
        } else {
            1
        };

        let (bcol, brow) = world.body_tile();
        world.camera.follow(bcol, brow, world.world.width(), world.world.height());

        self.front.clear();
        self.compose_game(world);
        if world.paused {
            self.compose_pause_overlay(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at start of frame; ResetColor would fall
        // back to the terminal default and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, w: &WorldState) {
        let buf_w = self.front.width;
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };

        // ── HUD row ──
        let mode = match w.mode {
            ControlMode::Manual => "MANUAL",
            ControlMode::Policy => "POLICY",
        };
        let action = w.last_action.map(|a| a.as_str()).unwrap_or("-");
        let (bcol, _) = w.body_tile();
        let hud = format!(
            " {}  runs:{}  col:{:<4}  act:{:<10}  [{}] ",
            mode, w.runs, bcol, action, w.backend,
        );
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, hud_bg));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Map (camera viewport) ──
        let cam = &w.camera;
        let goal_col = (w.goal_x / w.physics.tile_size).floor() as i32;
        let goal_top_row = (w.goal_top_y / w.physics.tile_size).floor() as i32;

        for vy in 0..cam.view_h {
            let wy = cam.y + vy as i32;
            let row = MAP_ROW + vy;
            if row >= self.front.height {
                break;
            }
            for vx in 0..cam.view_w {
                let wx = cam.x + vx as i32;
                let col = vx * CELL_W;
                if col + 1 >= buf_w {
                    break;
                }
                self.compose_tile(w, wx, wy, col, row, goal_col, goal_top_row);
            }
        }

        // ── Body (pixel space → tile cells it overlaps) ──
        self.compose_body(w);

        // ── Message bar ──
        let msg_row = MAP_ROW + cam.view_h + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            let bar_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            let msg = format!(" {} ", w.message);
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::new(' ', Color::Black, bar_bg));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, bar_bg);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + cam.view_h + 3;
        if help_row < self.front.height {
            let help = match w.mode {
                ControlMode::Manual =>
                    " arrows/AD:move  space/W:jump  Tab:policy  R:reset  P:pause  Q:quit",
                ControlMode::Policy =>
                    " Tab:manual  R:reset  P:pause  Q:quit",
            };
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_tile(
        &mut self,
        w: &WorldState,
        wx: i32,
        wy: i32,
        col: usize,
        row: usize,
        goal_col: i32,
        goal_top_row: i32,
    ) {
        // Goal column gets its own look: a flag on top of the pillar
        if wx == goal_col && wy >= goal_top_row && w.world.is_solid(wx, wy) {
            let (c0, c1, fg, bg) = if wy == goal_top_row {
                ('|', '>', Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset)
            } else {
                ('|', '|', Color::Rgb { r: 120, g: 220, b: 120 }, Color::Rgb { r: 20, g: 60, b: 20 })
            };
            self.front.set(col, row, Cell::new(c0, fg, bg));
            self.front.set(col + 1, row, Cell::new(c1, fg, bg));
            return;
        }

        let in_world =
            wx >= 0 && wy >= 0 && wx < w.world.width() as i32 && wy < w.world.height() as i32;
        let (c0, c1, fg, bg) = if in_world && w.world.is_solid(wx, wy) {
            (
                '░',
                '░',
                Color::Rgb { r: 180, g: 120, b: 60 },
                Color::Rgb { r: 100, g: 65, b: 30 },
            )
        } else {
            (' ', ' ', Color::Reset, Color::Reset)
        };
        self.front.set(col, row, Cell::new(c0, fg, bg));
        self.front.set(col + 1, row, Cell::new(c1, fg, bg));
    }

    /// Draw the body over the tile rows its box spans, at the column of
    /// its center.
    fn compose_body(&mut self, w: &WorldState) {
        let ts = w.physics.tile_size;
        let bcol = (w.body.center_x() / ts).floor() as i32;
        let head_row = (w.body.y / ts).floor() as i32;
        let foot_row = ((w.body.bottom() - 1.0) / ts).floor() as i32;

        let fg = Color::Rgb { r: 255, g: 90, b: 90 };
        let (head, feet) = match w.body.facing {
            Facing::Right => ('O', '>'),
            Facing::Left => ('O', '<'),
        };
        let glyphs = if head_row == foot_row {
            vec![(head_row, head)]
        } else {
            vec![(head_row, head), (foot_row, feet)]
        };
        for (wy, ch) in glyphs {
            if let Some((vx, vy)) = w.camera.world_to_view(bcol, wy) {
                let row = MAP_ROW + vy;
                let col = vx * CELL_W;
                if row < self.front.height && col + 1 < self.front.width {
                    self.front.set(col, row, Cell::new(ch, fg, Color::Reset));
                    self.front.set(col + 1, row, Cell::new(' ', fg, Color::Reset));
                }
            }
        }
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
        let cam = &w.camera;

        let view_cols = cam.view_w * CELL_W;
        let box_w = 24_usize.min(view_cols);
        let box_x = view_cols.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + cam.view_h.saturating_sub(5) / 2;

        for y in box_y..box_y + 5 {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::Reset, dim));
            }
        }
        self.front.put_str(box_x + 2, box_y + 1, "PAUSED", hdr, dim);
        self.front.put_str(box_x + 2, box_y + 3, "P resume  Q quit", Color::White, dim);
    }
}
