//! Block-glyph progress bar rendering

/// Number of glyphs in a rendered bar
pub const BAR_LENGTH: usize = 10;

/// Glyph for a completed unit
pub const FILLED: char = '🟩';

/// Glyph for a remaining unit
pub const EMPTY: char = '⬜';

/// Number of filled glyphs for `percent`, floored; values above 100 are clamped
pub fn filled_blocks(percent: u8) -> usize {
    usize::from(percent.min(100)) * BAR_LENGTH / 100
}

/// Render a bar of exactly [`BAR_LENGTH`] glyphs
pub fn render_bar(percent: u8) -> String {
    let filled = filled_blocks(percent);
    std::iter::repeat_n(FILLED, filled)
        .chain(std::iter::repeat_n(EMPTY, BAR_LENGTH - filled))
        .collect()
}

/// Render the bar followed by the percentage, e.g. `🟩🟩⬜⬜⬜⬜⬜⬜⬜⬜ 25%`
pub fn render_progress(percent: u8) -> String {
    format!("{} {}%", render_bar(percent), percent.min(100))
}
