//! End-to-end scenarios against the public API, run on a 40x10 grid.

use be_terminal::{Cell, CellAttrs, EngineConfig, Screen};
use expect_test::{Expect, expect};

fn screen() -> Screen {
    Screen::new(EngineConfig::new(40, 10))
}

fn cp(screen: &Screen, row: usize, col: usize) -> char {
    screen.cell(row, col).codepoint
}

/// Renders the occupied part of the grid as text, with `_` marking the
/// cursor cell, for eyeballing in a snapshot.
fn dump(screen: &Screen) -> String {
    let (cx, cy, _) = screen.cursor();
    let mut out = String::new();
    for row in 0..screen.height() {
        let mut line: Vec<char> = (0..screen.width()).map(|col| cp(screen, row, col)).collect();
        if row == cy && cx < line.len() {
            line[cx] = '_';
        }
        let trimmed: String = line.into_iter().collect::<String>().trim_end().to_string();
        if !trimmed.is_empty() || row <= cy {
            out.push_str(&trimmed);
            out.push('\n');
        }
    }
    out
}

fn check(screen: &Screen, expect: Expect) {
    expect.assert_eq(&dump(screen));
}

#[test]
fn grid_dump_snapshot_for_text_and_control() {
    let mut s = screen();
    s.feed(b"Line1\nLine2");
    check(
        &s,
        expect![[r#"
            Line1
            Line2_
        "#]],
    );
}

#[test]
fn text_and_control() {
    let mut s = screen();
    s.feed(b"Line1\nLine2");

    assert_eq!(cp(&s, 0, 0), 'L');
    assert_eq!(cp(&s, 0, 1), 'i');
    assert_eq!(cp(&s, 0, 2), 'n');
    assert_eq!(cp(&s, 0, 3), 'e');
    assert_eq!(cp(&s, 0, 4), '1');
    assert_eq!(cp(&s, 1, 0), 'L');
    assert_eq!(cp(&s, 1, 1), 'i');
    assert_eq!(cp(&s, 1, 2), 'n');
    assert_eq!(cp(&s, 1, 3), 'e');
    assert_eq!(cp(&s, 1, 4), '2');
    assert_eq!(s.cursor(), (5, 1, true));
}

#[test]
fn sgr_with_reset() {
    let mut s = screen();
    s.feed(b"\x1b[1;4;31;42mA\x1b[0mB");

    let a = s.cell(0, 0);
    assert_eq!(a.fg, 1);
    assert_eq!(a.bg, 2);
    assert!(a.attrs.contains(CellAttrs::BOLD));
    assert!(a.attrs.contains(CellAttrs::UNDERLINE));

    let b = s.cell(0, 1);
    assert_eq!(b.fg, -1);
    assert_eq!(b.bg, -1);
    assert_eq!(b.attrs, CellAttrs::empty());
}

#[test]
fn bright_color_implies_bold() {
    let mut s = screen();
    s.feed(b"\x1b[91mX\x1b[39m");

    let x = s.cell(0, 0);
    assert_eq!(x.fg, 1);
    assert!(x.attrs.contains(CellAttrs::BOLD));
}

#[test]
fn cursor_positioning() {
    let mut s = screen();
    s.feed(b"\x1b[3;10H*");

    assert_eq!(cp(&s, 2, 9), '*');
    assert_eq!(s.cursor(), (10, 2, true));
}

#[test]
fn erase_in_display_from_mid_screen() {
    let mut s = screen();
    s.feed(b"L1\nL2\nL3\n");
    s.feed(b"\x1b[2;3H\x1b[0J");

    assert_eq!(cp(&s, 0, 0), 'L');
    assert_eq!(cp(&s, 0, 1), '1');
    for col in 3..40 {
        assert_eq!(cp(&s, 1, col), ' ', "row 1 col {col}");
    }
    for col in 0..40 {
        assert_eq!(cp(&s, 2, col), ' ', "row 2 col {col}");
    }
}

#[test]
fn dec_special_charset_line_drawing() {
    let mut s = screen();
    s.feed(b"\x1b(0qqq\x1b(B");

    for col in 0..3 {
        assert_eq!(cp(&s, 0, col), '\u{2500}');
    }
}

#[test]
fn extended_256_color_sgr() {
    let mut s = screen();
    s.feed(b"\x1b[38;5;196mZ");

    assert_eq!(s.cell(0, 0).fg, 196);
}

#[test]
fn save_restore_round_trip() {
    let mut s = screen();
    s.feed(b"\x1b[5;10H\x1b[31mRed\x1b[s\x1b[1;1H\x1b[32mGreen\x1b[u");

    let (x, y, _) = s.cursor();
    assert_eq!((x, y), (12, 4));
    assert_eq!(s.cell(4, 9).fg, 1);
}

#[test]
fn tab_behavior() {
    let mut s = screen();
    s.feed(b"A\tB");

    assert_eq!(cp(&s, 0, 0), 'A');
    assert_eq!(cp(&s, 0, 8), 'B');
    assert_eq!(s.cursor(), (9, 0, true));
}

#[test]
fn sgr_colon_subparameter_rgb_matches_legacy_form() {
    let mut legacy = screen();
    legacy.feed(b"\x1b[38;2;255;0;0mA");

    let mut colon = screen();
    colon.feed(b"\x1b[38:2::255:0:0mA");

    assert_eq!(legacy.cell(0, 0).fg, colon.cell(0, 0).fg);
}

#[test]
fn pending_wrap_defers_scroll_until_next_print() {
    let mut s = screen();
    s.feed(b"\x1b[1;40H");
    s.feed(b"X");
    // Cursor sits past the last column with the wrap pending, not yet moved.
    assert_eq!(s.cursor(), (39, 0, true));
    assert_eq!(cp(&s, 0, 39), 'X');

    s.feed(b"Y");
    assert_eq!(cp(&s, 1, 0), 'Y');
    assert_eq!(s.cursor(), (1, 1, true));
}

#[test]
fn slice_invariance_across_feed_calls() {
    let input = b"Line1\x1b[1;31mX\x1b[0m\nLine2\x1b[38;5;196mZ";

    let mut whole = screen();
    whole.feed(input);

    for split in 0..=input.len() {
        let mut parts = screen();
        parts.feed(&input[..split]);
        parts.feed(&input[split..]);

        for row in 0..10 {
            for col in 0..40 {
                assert_eq!(parts.cell(row, col), whole.cell(row, col), "split at {split}, cell [{row}][{col}]");
            }
        }
        assert_eq!(parts.cursor(), whole.cursor(), "split at {split}");
    }
}

#[test]
fn reset_returns_to_a_fresh_screen() {
    let mut s = screen();
    s.feed(b"\x1b[1;31mhello\x1b[3;3H");
    s.feed(b"\x1bc");

    let fresh = screen();
    assert_eq!(s.cursor(), fresh.cursor());
    assert_eq!(s.cell(0, 0), Cell::default());
}

#[test]
fn resize_preserves_overlapping_cells_and_clamps_cursor() {
    let mut s = screen();
    s.feed(b"\x1b[9;39Hhi");
    s.resize(10, 5);

    assert_eq!(s.width(), 10);
    assert_eq!(s.height(), 5);
    let (x, y, _) = s.cursor();
    assert!(x < 10);
    assert!(y < 5);
}

#[test]
fn scroll_covering_the_whole_region_does_not_panic() {
    let mut s = Screen::new(EngineConfig::default());
    s.feed(b"\x1b[24S");
    for col in 0..s.width() {
        assert_eq!(s.cell(0, col).codepoint, ' ');
    }

    let mut s = Screen::new(EngineConfig::default());
    s.feed(b"\x1b[24T");

    let mut s = Screen::new(EngineConfig::default());
    s.feed(b"\x1b[24L");

    let mut s = Screen::new(EngineConfig::default());
    s.feed(b"\x1b[24M");
}

#[test]
fn erase_chars_blanks_with_current_pen() {
    let mut s = screen();
    s.feed(b"\x1b[44m\x1b[3X");

    let blanked = s.cell(0, 0);
    assert_eq!(blanked.codepoint, ' ');
    assert_eq!(blanked.bg, 4);
    assert_eq!(blanked.fg, -1);
}

#[test]
fn invalid_scrolling_region_leaves_cursor_untouched() {
    let mut s = screen();
    s.feed(b"\x1b[5;20H");
    let before = s.cursor();

    s.feed(b"\x1b[20;5r");

    assert_eq!(s.cursor(), before);
}
