/// C0 set of 7-bit control characters (from ANSI X3.4-1977).
#[allow(unused, non_snake_case)]
pub mod C0 {
  /// Null filler, terminal should ignore this character.
  pub const NUL: u8 = 0x00;
  /// Bell, triggers the bell, buzzer, or beeper on the terminal.
  pub const BEL: u8 = 0x07;
  /// Backspace, can be used to define overstruck characters.
  pub const BS: u8 = 0x08;
  /// Horizontal Tabulation, move to next predetermined position.
  pub const HT: u8 = 0x09;
  /// Linefeed, move to same position on next line (see also NL).
  pub const LF: u8 = 0x0A;
  /// Vertical Tabulation, move to next predetermined line.
  pub const VT: u8 = 0x0B;
  /// Form Feed, move to next form or page.
  pub const FF: u8 = 0x0C;
  /// Carriage Return, move to first character of current line.
  pub const CR: u8 = 0x0D;
  /// Shift Out, switch to G1 (other half of character set).
  pub const SO: u8 = 0x0E;
  /// Shift In, switch to G0 (normal half of character set).
  pub const SI: u8 = 0x0F;
  /// Cancel (makes VT100 abort current escape sequence if any).
  pub const CAN: u8 = 0x18;
  /// Substitute (VT100 uses this to display parity errors).
  pub const SUB: u8 = 0x1A;
  /// Prefix to an escape sequence.
  pub const ESC: u8 = 0x1B;
  /// Delete, should be ignored by terminal.
  pub const DEL: u8 = 0x7F;
}
