use bitflags::bitflags;

bitflags! {
  /// Graphic rendition flags for a single [`Cell`], set by SGR.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
  pub struct CellAttrs: u16 {
    const BOLD          = 0b0000_0000_0001;
    const DIM            = 0b0000_0000_0010;
    const ITALIC         = 0b0000_0000_0100;
    const UNDERLINE      = 0b0000_0000_1000;
    const BLINK          = 0b0000_0001_0000;
    const REVERSE        = 0b0000_0010_0000;
    const HIDDEN         = 0b0000_0100_0000;
    const STRIKETHROUGH  = 0b0000_1000_0000;
  }
}

/// Sentinel color index meaning "use the terminal's default", as opposed to
/// one of the 16 palette slots.
pub const DEFAULT_COLOR: i16 = -1;

/// One position in the grid: a codepoint plus the graphic rendition it was
/// written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
  pub codepoint: char,
  pub fg: i16,
  pub bg: i16,
  pub attrs: CellAttrs,
}

impl Default for Cell {
  fn default() -> Self {
    Cell { codepoint: ' ', fg: DEFAULT_COLOR, bg: DEFAULT_COLOR, attrs: CellAttrs::empty() }
  }
}

/// The graphic rendition newly written cells inherit: everything a [`Cell`]
/// carries, minus the codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pen {
  pub fg: i16,
  pub bg: i16,
  pub attrs: CellAttrs,
}

impl Default for Pen {
  fn default() -> Self {
    Pen { fg: DEFAULT_COLOR, bg: DEFAULT_COLOR, attrs: CellAttrs::empty() }
  }
}

impl Pen {
  pub fn reset(&mut self) {
    *self = Pen::default();
  }
}
