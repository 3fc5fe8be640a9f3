//! The cell-grid terminal model: cursor, pen, scrolling region, tab stops,
//! modes, and character sets, driven by [`crate::parser::Parser`] events.

pub mod cell;
pub mod charset;
mod control;

use bitflags::bitflags;

use crate::EngineConfig;
use crate::parser::{Params, Parser, Perform};
use cell::{Cell, DEFAULT_COLOR, Pen};
use charset::{CharsetState, GSlot, charset_from_final};

bitflags! {
  /// Boolean terminal modes toggled by `SM`/`RM`/`DECSET`/`DECRST`.
  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  pub struct Modes: u16 {
    const INSERT                    = 0b0000_0001;
    const AUTO_WRAP                 = 0b0000_0010;
    const ORIGIN                    = 0b0000_0100;
    const CURSOR_VISIBLE             = 0b0000_1000;
    const BRACKETED_PASTE            = 0b0001_0000;
    const APPLICATION_CURSOR_KEYS    = 0b0010_0000;
    const APPLICATION_KEYPAD         = 0b0100_0000;
    const LOCAL_ECHO_DISABLED        = 0b1000_0000;
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
  pub x: usize,
  pub y: usize,
  pub pending_wrap: bool,
}

#[derive(Debug, Clone, Copy)]
struct SavedState {
  cursor: (usize, usize),
  pen: Pen,
}

#[derive(Debug, Clone, Copy)]
struct ScrollingRegion {
  top: usize,
  bottom: usize,
}

/// The terminal engine: owns a [`Parser`] and the grid it mutates.
///
/// `Screen` itself is not the [`Perform`] implementation. `ScreenState` is,
/// so that `feed` can borrow the parser and the state as two disjoint
/// fields instead of trying to mutably borrow `self` twice.
pub struct Screen {
  parser: Parser,
  state: ScreenState,
}

struct ScreenState {
  width: usize,
  height: usize,
  grid: Vec<Cell>,
  cursor: Cursor,
  pen: Pen,
  saved: Option<SavedState>,
  region: ScrollingRegion,
  tabs: Vec<bool>,
  tab_interval: usize,
  modes: Modes,
  default_auto_wrap: bool,
  charset: CharsetState,
  last_title: Option<String>,
}

impl Screen {
  pub fn new(config: EngineConfig) -> Self {
    Screen { parser: Parser::new(), state: ScreenState::new(config) }
  }

  /// Hard reset: as if the screen had just been constructed with its
  /// original configuration. Also the behavior of `ESC c` (RIS).
  pub fn reset(&mut self) {
    self.parser = Parser::new();
    self.state.reset();
  }

  /// Resize the grid, truncating or padding with blank cells. Does not
  /// attempt to rewrap text; the cursor is clamped into the new bounds.
  pub fn resize(&mut self, width: usize, height: usize) {
    self.state.resize(width, height);
  }

  /// Stream bytes through the parser, applying every event they produce to
  /// the grid. Splitting one logical write into several `feed` calls
  /// produces identical state to one call with the concatenated bytes.
  pub fn feed(&mut self, bytes: &[u8]) {
    self.parser.advance_slice(&mut self.state, bytes);
  }

  pub fn width(&self) -> usize { self.state.width }
  pub fn height(&self) -> usize { self.state.height }

  pub fn cell(&self, row: usize, col: usize) -> Cell {
    self.state.grid[self.state.index(row, col)]
  }

  pub fn cursor(&self) -> (usize, usize, bool) {
    (self.state.cursor.x, self.state.cursor.y, self.state.modes.contains(Modes::CURSOR_VISIBLE))
  }

  pub fn mode(&self, mode: Modes) -> bool { self.state.modes.contains(mode) }

  pub fn last_title(&self) -> Option<&str> { self.state.last_title.as_deref() }
}

impl ScreenState {
  fn new(config: EngineConfig) -> Self {
    let width = config.width.max(1);
    let height = config.height.max(1);
    let tab_interval = config.tab_interval.max(1);

    ScreenState {
      width,
      height,
      grid: vec![Cell::default(); width * height],
      cursor: Cursor::default(),
      pen: Pen::default(),
      saved: None,
      region: ScrollingRegion { top: 0, bottom: height - 1 },
      tabs: default_tabs(width, tab_interval),
      tab_interval,
      modes: default_modes(config.auto_wrap),
      default_auto_wrap: config.auto_wrap,
      charset: CharsetState::default(),
      last_title: None,
    }
  }

  fn reset(&mut self) {
    let width = self.width;
    let height = self.height;
    let tab_interval = self.tab_interval;
    let auto_wrap = self.default_auto_wrap;

    self.grid = vec![Cell::default(); width * height];
    self.cursor = Cursor::default();
    self.pen = Pen::default();
    self.saved = None;
    self.region = ScrollingRegion { top: 0, bottom: height - 1 };
    self.tabs = default_tabs(width, tab_interval);
    self.modes = default_modes(auto_wrap);
    self.charset = CharsetState::default();
    self.last_title = None;
  }

  fn resize(&mut self, width: usize, height: usize) {
    let width = width.max(1);
    let height = height.max(1);

    let mut grid = vec![Cell::default(); width * height];
    for row in 0..height.min(self.height) {
      for col in 0..width.min(self.width) {
        grid[row * width + col] = self.grid[row * self.width + col];
      }
    }
    self.grid = grid;
    self.width = width;
    self.height = height;
    self.cursor.x = self.cursor.x.min(width - 1);
    self.cursor.y = self.cursor.y.min(height - 1);
    self.cursor.pending_wrap = false;
    self.region = ScrollingRegion { top: 0, bottom: height - 1 };
    self.tabs = default_tabs(width, self.tab_interval);
  }

  #[inline]
  fn index(&self, row: usize, col: usize) -> usize { row * self.width + col }

  fn blank_cell(&self) -> Cell { Cell { codepoint: ' ', fg: self.pen.fg, bg: self.pen.bg, attrs: self.pen.attrs } }

  fn clamp_cursor(&mut self) {
    self.cursor.x = self.cursor.x.min(self.width - 1);
    self.cursor.y = self.cursor.y.min(self.height - 1);
  }

  fn move_cursor(&mut self, x: usize, y: usize) {
    self.cursor.pending_wrap = false;
    self.cursor.x = x;
    self.cursor.y = y;
    self.clamp_cursor();
  }

  /// The vertical half of a line feed: scroll if the cursor sits on the
  /// scrolling region's bottom margin, otherwise move down one row.
  fn advance_line(&mut self) {
    if self.cursor.y == self.region.bottom {
      self.scroll_up(1);
    } else if self.cursor.y + 1 < self.height {
      self.cursor.y += 1;
    }
  }

  fn scroll_up(&mut self, n: usize) { self.scroll_region(n, true); }
  fn scroll_down(&mut self, n: usize) { self.scroll_region(n, false); }

  fn scroll_region(&mut self, n: usize, up: bool) {
    let top = self.region.top;
    let bottom = self.region.bottom;
    if top >= bottom {
      return;
    }
    let span = bottom - top + 1;
    let n = n.min(span);
    let blank = self.blank_cell();

    if n == span {
      for row in top..=bottom {
        for col in 0..self.width {
          let idx = self.index(row, col);
          self.grid[idx] = blank;
        }
      }
      return;
    }

    if up {
      for row in top..=bottom - n {
        for col in 0..self.width {
          let dst = self.index(row, col);
          let src = self.index(row + n, col);
          self.grid[dst] = self.grid[src];
        }
      }
      for row in bottom - n + 1..=bottom {
        for col in 0..self.width {
          let idx = self.index(row, col);
          self.grid[idx] = blank;
        }
      }
    } else {
      for row in (top + n..=bottom).rev() {
        for col in 0..self.width {
          let dst = self.index(row, col);
          let src = self.index(row - n, col);
          self.grid[dst] = self.grid[src];
        }
      }
      for row in top..top + n {
        for col in 0..self.width {
          let idx = self.index(row, col);
          self.grid[idx] = blank;
        }
      }
    }
  }

  fn insert_lines(&mut self, n: usize) {
    if self.cursor.y < self.region.top || self.cursor.y > self.region.bottom {
      return;
    }
    let saved_top = self.region.top;
    self.region.top = self.cursor.y;
    self.scroll_down(n);
    self.region.top = saved_top;
  }

  fn delete_lines(&mut self, n: usize) {
    if self.cursor.y < self.region.top || self.cursor.y > self.region.bottom {
      return;
    }
    let saved_top = self.region.top;
    self.region.top = self.cursor.y;
    self.scroll_up(n);
    self.region.top = saved_top;
  }

  fn insert_chars(&mut self, n: usize) {
    let row = self.cursor.y;
    let n = n.min(self.width - self.cursor.x);
    let blank = self.blank_cell();
    for col in (self.cursor.x + n..self.width).rev() {
      let dst = self.index(row, col);
      let src = self.index(row, col - n);
      self.grid[dst] = self.grid[src];
    }
    for col in self.cursor.x..self.cursor.x + n {
      let idx = self.index(row, col);
      self.grid[idx] = blank;
    }
  }

  fn delete_chars(&mut self, n: usize) {
    let row = self.cursor.y;
    let n = n.min(self.width - self.cursor.x);
    let blank = self.blank_cell();
    for col in self.cursor.x..self.width - n {
      let dst = self.index(row, col);
      let src = self.index(row, col + n);
      self.grid[dst] = self.grid[src];
    }
    for col in self.width - n..self.width {
      let idx = self.index(row, col);
      self.grid[idx] = blank;
    }
  }

  fn erase_chars(&mut self, n: usize) {
    let row = self.cursor.y;
    let blank = self.blank_cell();
    let end = (self.cursor.x + n).min(self.width);
    for col in self.cursor.x..end {
      let idx = self.index(row, col);
      self.grid[idx] = blank;
    }
  }

  fn erase_in_line(&mut self, mode: u16) {
    let row = self.cursor.y;
    let blank = self.blank_cell();
    let (start, end) = match mode {
      0 => (self.cursor.x, self.width),
      1 => (0, self.cursor.x + 1),
      2 => (0, self.width),
      _ => return,
    };
    for col in start..end.min(self.width) {
      let idx = self.index(row, col);
      self.grid[idx] = blank;
    }
  }

  fn erase_in_display(&mut self, mode: u16) {
    let blank = self.blank_cell();
    match mode {
      0 => {
        self.erase_in_line(0);
        for row in self.cursor.y + 1..self.height {
          for col in 0..self.width {
            let idx = self.index(row, col);
            self.grid[idx] = blank;
          }
        }
      }
      1 => {
        self.erase_in_line(1);
        for row in 0..self.cursor.y {
          for col in 0..self.width {
            let idx = self.index(row, col);
            self.grid[idx] = blank;
          }
        }
      }
      2 | 3 => self.grid.fill(blank),
      _ => {}
    }
  }

  fn next_tab_stop(&self, from: usize) -> usize {
    for col in from + 1..self.width {
      if self.tabs[col] {
        return col;
      }
    }
    self.width - 1
  }

  fn prev_tab_stop(&self, from: usize) -> usize {
    for col in (0..from).rev() {
      if self.tabs[col] {
        return col;
      }
    }
    0
  }

  fn save_cursor(&mut self) {
    self.saved = Some(SavedState { cursor: (self.cursor.x, self.cursor.y), pen: self.pen });
  }

  fn restore_cursor(&mut self) {
    if let Some(saved) = self.saved {
      self.move_cursor(saved.cursor.0, saved.cursor.1);
      self.pen = saved.pen;
    }
  }

  fn set_mode(&mut self, params: &Params, intermediates: &[u8], set: bool) {
    let private = intermediates == [b'?'];
    for group in params.iter() {
      let Some(&n) = group.first() else { continue };
      if private {
        match n {
          1 => self.modes.set(Modes::APPLICATION_CURSOR_KEYS, set),
          6 => self.modes.set(Modes::ORIGIN, set),
          7 => self.modes.set(Modes::AUTO_WRAP, set),
          25 => self.modes.set(Modes::CURSOR_VISIBLE, set),
          2004 => self.modes.set(Modes::BRACKETED_PASTE, set),
          _ => log::trace!("unhandled DEC private mode {n}"),
        }
      } else {
        match n {
          4 => self.modes.set(Modes::INSERT, set),
          12 => self.modes.set(Modes::LOCAL_ECHO_DISABLED, set),
          20 => self.modes.set(Modes::AUTO_WRAP, set),
          _ => log::trace!("unhandled ANSI mode {n}"),
        }
      }
    }
  }

  fn set_scrolling_region(&mut self, params: &Params) {
    let top = params.get_single(0, 1).saturating_sub(1) as usize;
    let bottom = params.get_single(1, self.height as u16).saturating_sub(1) as usize;
    if top < bottom && bottom < self.height {
      self.region = ScrollingRegion { top, bottom };
      self.move_cursor(0, 0);
    } else {
      log::trace!("rejected scrolling region {top}..={bottom}");
    }
  }

  fn sgr(&mut self, params: &Params) {
    let mut groups = params.iter();
    while let Some(group) = groups.next() {
      let code = group.first().copied().unwrap_or(0);
      match code {
        0 => self.pen.reset(),
        1 => self.pen.attrs.insert(cell::CellAttrs::BOLD),
        2 => self.pen.attrs.insert(cell::CellAttrs::DIM),
        3 => self.pen.attrs.insert(cell::CellAttrs::ITALIC),
        4 => self.pen.attrs.insert(cell::CellAttrs::UNDERLINE),
        5 => self.pen.attrs.insert(cell::CellAttrs::BLINK),
        7 => self.pen.attrs.insert(cell::CellAttrs::REVERSE),
        8 => self.pen.attrs.insert(cell::CellAttrs::HIDDEN),
        9 => self.pen.attrs.insert(cell::CellAttrs::STRIKETHROUGH),
        22 => self.pen.attrs.remove(cell::CellAttrs::BOLD | cell::CellAttrs::DIM),
        23 => self.pen.attrs.remove(cell::CellAttrs::ITALIC),
        24 => self.pen.attrs.remove(cell::CellAttrs::UNDERLINE),
        25 => self.pen.attrs.remove(cell::CellAttrs::BLINK),
        27 => self.pen.attrs.remove(cell::CellAttrs::REVERSE),
        28 => self.pen.attrs.remove(cell::CellAttrs::HIDDEN),
        29 => self.pen.attrs.remove(cell::CellAttrs::STRIKETHROUGH),
        30..=37 => self.pen.fg = (code - 30) as i16,
        39 => self.pen.fg = DEFAULT_COLOR,
        40..=47 => self.pen.bg = (code - 40) as i16,
        49 => self.pen.bg = DEFAULT_COLOR,
        90..=97 => {
          self.pen.fg = (code - 90) as i16;
          self.pen.attrs.insert(cell::CellAttrs::BOLD);
        }
        100..=107 => self.pen.bg = (code - 100) as i16,
        38 | 48 => self.sgr_extended_color(code == 38, group, &mut groups),
        _ => log::trace!("unhandled SGR code {code}"),
      }
    }
  }

  fn sgr_extended_color<'a>(
    &mut self,
    is_fg: bool,
    group: &[u16],
    groups: &mut impl Iterator<Item = &'a [u16]>,
  ) {
    let index = if group.len() > 1 {
      // Colon subparameter form: `38:5:n` or `38:2[:colorspace]:r:g:b`.
      match (group[1], group.len()) {
        (5, n) if n >= 3 => Some(group[2] as i16),
        (2, n) if n >= 6 => Some(rgb_to_index(group[3], group[4], group[5])),
        (2, n) if n >= 5 => Some(rgb_to_index(group[2], group[3], group[4])),
        _ => None,
      }
    } else {
      // Legacy semicolon-chained form: `38;5;n` or `38;2;r;g;b`.
      match groups.next().and_then(|g| g.first().copied()) {
        Some(5) => groups.next().and_then(|g| g.first().copied()).map(|n| n as i16),
        Some(2) => {
          let r = groups.next().and_then(|g| g.first().copied()).unwrap_or(0);
          let g = groups.next().and_then(|g| g.first().copied()).unwrap_or(0);
          let b = groups.next().and_then(|g| g.first().copied()).unwrap_or(0);
          Some(rgb_to_index(r, g, b))
        }
        _ => None,
      }
    };

    if let Some(index) = index {
      if is_fg {
        self.pen.fg = index;
      } else {
        self.pen.bg = index;
      }
    }
  }
}

fn rgb_to_index(r: u16, g: u16, b: u16) -> i16 {
  (r > 127) as i16 | ((g > 127) as i16) << 1 | ((b > 127) as i16) << 2
}

fn default_modes(auto_wrap: bool) -> Modes {
  let mut modes = Modes::CURSOR_VISIBLE;
  modes.set(Modes::AUTO_WRAP, auto_wrap);
  modes
}

fn default_tabs(width: usize, interval: usize) -> Vec<bool> {
  (0..width).map(|col| col > 0 && col % interval == 0).collect()
}

impl Perform for ScreenState {
  fn print(&mut self, c: char) {
    let c = self.charset.translate(c);

    if self.cursor.pending_wrap {
      self.cursor.x = 0;
      self.advance_line();
      self.cursor.pending_wrap = false;
    }

    if self.modes.contains(Modes::INSERT) {
      self.insert_chars(1);
    }

    let idx = self.index(self.cursor.y, self.cursor.x);
    self.grid[idx] = Cell { codepoint: c, fg: self.pen.fg, bg: self.pen.bg, attrs: self.pen.attrs };

    if self.cursor.x + 1 < self.width {
      self.cursor.x += 1;
    } else if self.modes.contains(Modes::AUTO_WRAP) {
      self.cursor.pending_wrap = true;
    }
  }

  fn execute(&mut self, byte: u8) {
    use control::C0;

    match byte {
      C0::BS => {
        self.cursor.pending_wrap = false;
        self.cursor.x = self.cursor.x.saturating_sub(1);
      }
      C0::HT => {
        self.cursor.pending_wrap = false;
        self.cursor.x = self.next_tab_stop(self.cursor.x);
      }
      C0::LF | C0::VT | C0::FF => {
        self.cursor.pending_wrap = false;
        self.cursor.x = 0;
        self.advance_line();
      }
      C0::CR => {
        self.cursor.pending_wrap = false;
        self.cursor.x = 0;
      }
      C0::SO => self.charset.shift_out(),
      C0::SI => self.charset.shift_in(),
      C0::BEL => {}
      _ => log::trace!("unhandled C0 control 0x{byte:02x}"),
    }
  }

  fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], _ignore: bool, action: u8) {
    let n = || params.get_single(0, 1) as usize;
    let private = intermediates == [b'?'];

    match action {
      b'A' => self.move_cursor(self.cursor.x, self.cursor.y.saturating_sub(n())),
      b'B' => self.move_cursor(self.cursor.x, (self.cursor.y + n()).min(self.height - 1)),
      b'C' => self.move_cursor((self.cursor.x + n()).min(self.width - 1), self.cursor.y),
      b'D' => self.move_cursor(self.cursor.x.saturating_sub(n()), self.cursor.y),
      b'E' => self.move_cursor(0, (self.cursor.y + n()).min(self.height - 1)),
      b'F' => self.move_cursor(0, self.cursor.y.saturating_sub(n())),
      b'G' | b'`' => self.move_cursor((n() - 1).min(self.width - 1), self.cursor.y),
      b'd' => {
        let origin = if self.modes.contains(Modes::ORIGIN) { self.region.top } else { 0 };
        self.move_cursor(self.cursor.x, (origin + n() - 1).min(self.height - 1));
      }
      b'H' | b'f' => {
        let row = params.get_single(0, 1) as usize;
        let col = params.get_single(1, 1) as usize;
        let origin = if self.modes.contains(Modes::ORIGIN) { self.region.top } else { 0 };
        self.move_cursor((col.saturating_sub(1)).min(self.width - 1), (origin + row - 1).min(self.height - 1));
      }
      b'I' => {
        let mut x = self.cursor.x;
        for _ in 0..n() {
          x = self.next_tab_stop(x);
        }
        self.move_cursor(x, self.cursor.y);
      }
      b'Z' => {
        let mut x = self.cursor.x;
        for _ in 0..n() {
          x = self.prev_tab_stop(x);
        }
        self.move_cursor(x, self.cursor.y);
      }
      b'J' => self.erase_in_display(params.get_single(0, 0)),
      b'K' => self.erase_in_line(params.get_single(0, 0)),
      b'L' => self.insert_lines(n()),
      b'M' => self.delete_lines(n()),
      b'@' => self.insert_chars(n()),
      b'P' => self.delete_chars(n()),
      b'X' => self.erase_chars(n()),
      b'S' => self.scroll_up(n()),
      b'T' => self.scroll_down(n()),
      b'g' => match params.get_single(0, 0) {
        0 => self.tabs[self.cursor.x] = false,
        3 => self.tabs.fill(false),
        _ => {}
      },
      b'h' => self.set_mode(params, intermediates, true),
      b'l' => self.set_mode(params, intermediates, false),
      b'm' => self.sgr(params),
      b'r' => self.set_scrolling_region(params),
      b's' if !private => self.save_cursor(),
      b'u' if !private => self.restore_cursor(),
      _ => log::trace!("unhandled CSI {}", action as char),
    }
  }

  fn esc_dispatch(&mut self, intermediates: &[u8], _ignore: bool, byte: u8) {
    match intermediates {
      [b'('] => {
        if let Some(cs) = charset_from_final(byte) {
          self.charset.designate(GSlot::G0, cs);
        }
      }
      [b')'] => {
        if let Some(cs) = charset_from_final(byte) {
          self.charset.designate(GSlot::G1, cs);
        }
      }
      [b'*'] | [b'+'] => {}
      [] => match byte {
        b'7' => self.save_cursor(),
        b'8' => self.restore_cursor(),
        b'c' => self.reset(),
        b'D' => self.advance_line(),
        b'E' => {
          self.cursor.x = 0;
          self.advance_line();
        }
        b'H' => self.tabs[self.cursor.x] = true,
        b'M' => {
          if self.cursor.y == self.region.top {
            self.scroll_down(1);
          } else {
            self.cursor.y = self.cursor.y.saturating_sub(1);
          }
        }
        b'=' => self.modes.insert(Modes::APPLICATION_KEYPAD),
        b'>' => self.modes.remove(Modes::APPLICATION_KEYPAD),
        _ => log::trace!("unhandled ESC {}", byte as char),
      },
      _ => {}
    }
  }

  fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
    let Some(command) = params.first().and_then(|p| std::str::from_utf8(p).ok()).and_then(|s| s.parse::<u32>().ok())
    else {
      return;
    };

    match command {
      0 | 1 | 2 => {
        if let Some(title) = params.get(1) {
          self.last_title = Some(String::from_utf8_lossy(title).into_owned());
        }
      }
      _ => log::trace!("unhandled OSC command {command}"),
    }
  }
}
