//! Score lines: underline, strikethrough and overscore.
//!
//! A line is three pixels tall. The centre row carries full ink for solid
//! lines; the shoulders (and the centre of broken lines) are drawn at 120 to
//! soften the edge. Broken lines repeat a dash of 4/5 of a 1/15-inch period.

use super::surface::PageSurface;

/// Ink for the line shoulders and for broken lines.
pub const SHOULDER_INK: u8 = 120;

/// Dash period of broken lines, in pixels.
#[inline]
pub fn break_period(dpi: u16) -> i32 {
    (i32::from(dpi) / 15).max(1)
}

/// Draw a horizontal score line over `from_x..=to_x` centred on row `y`.
pub fn draw_hline(surface: &mut PageSurface, dpi: u16, from_x: i32, to_x: i32, y: i32, broken: bool) {
    let breakmod = break_period(dpi);
    let gapstart = breakmod * 4 / 5;
    let centre = if broken { SHOULDER_INK } else { 255 };

    for x in from_x..=to_x {
        if broken && x.rem_euclid(breakmod) > gapstart {
            continue;
        }
        surface.put(x, y - 1, SHOULDER_INK);
        surface.put(x, y, centre);
        surface.put(x, y + 1, SHOULDER_INK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_line_profile() {
        let mut s = PageSurface::new(40, 10);
        draw_hline(&mut s, 360, 2, 10, 5, false);
        for x in 2..=10 {
            assert_eq!(s.get(x, 4), Some(SHOULDER_INK));
            assert_eq!(s.get(x, 5), Some(255));
            assert_eq!(s.get(x, 6), Some(SHOULDER_INK));
        }
        assert_eq!(s.get(1, 5), Some(0));
        assert_eq!(s.get(11, 5), Some(0));
    }

    #[test]
    fn test_broken_line_gaps() {
        // 360 dpi: period 24, dash covers x % 24 <= 19
        let mut s = PageSurface::new(60, 4);
        draw_hline(&mut s, 360, 0, 47, 1, true);
        assert_eq!(s.get(19, 1), Some(SHOULDER_INK));
        assert_eq!(s.get(20, 1), Some(0));
        assert_eq!(s.get(23, 1), Some(0));
        assert_eq!(s.get(24, 1), Some(SHOULDER_INK));
    }

    #[test]
    fn test_line_at_top_edge() {
        let mut s = PageSurface::new(8, 4);
        draw_hline(&mut s, 360, 0, 3, 0, false);
        assert_eq!(s.get(0, 0), Some(255));
        assert_eq!(s.get(0, 1), Some(SHOULDER_INK));
    }
}
