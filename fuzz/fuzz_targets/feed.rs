#![no_main]

use arbitrary::Arbitrary;
use be_terminal::{EngineConfig, Screen};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    height: u8,
    tab_interval: u8,
    bytes: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let config = EngineConfig {
        width: input.width as usize,
        height: input.height as usize,
        tab_interval: input.tab_interval as usize,
        auto_wrap: true,
    };
    let mut screen = Screen::new(config);
    screen.feed(&input.bytes);

    let (x, y, _visible) = screen.cursor();
    assert!(x < screen.width());
    assert!(y < screen.height());

    for row in 0..screen.height() {
        for col in 0..screen.width() {
            let _ = screen.cell(row, col).codepoint;
        }
    }
});
