//! # ESC/P Printer Device
//!
//! [`EscpPrinter`] ties the pieces together: it owns the printer state, the
//! page surface, a font context and a page sink, and turns incoming bytes
//! into ink.
//!
//! ## Byte Path
//!
//! ```text
//! byte ─► MSB mode ─► bit image active? ──yes──► graphics column
//!                         │ no
//!                         ▼
//!                   verbatim count? ──yes──► glyph
//!                         │ no
//!                         ▼
//!                   interpreter ──consumed──► (state change)
//!                         │ not a command
//!                         ▼
//!                       glyph
//! ```
//!
//! ## Page Lifecycle
//!
//! The surface is allocated once, from the configured page geometry. A page
//! is handed to the sink when it is dirty and one of these happens: form
//! feed, paper eject, vertical overflow past the bottom margin, or the
//! device is closed or dropped. The surface is then cleared and the head
//! returns to the top margin.

use log::{error, info};

use crate::font::{FontContext, GlyphRasterizer};
use crate::port::Handshake;
use crate::printer::config::PrinterConfig;
use crate::printer::state::{PrinterState, Score, Style};
use crate::render::bit_image::render_column;
use crate::render::score::draw_hline;
use crate::render::surface::{Blend, PageSurface};
use crate::spool::PageSink;

/// Offset between a glyph's bottom row and its underline, and between the
/// two lines of a double score.
const SCORE_GAP: i32 = 5;

/// An emulated ESC/P dot-matrix printer.
pub struct EscpPrinter<S: PageSink> {
    config: PrinterConfig,
    pub(crate) state: PrinterState,
    pub(crate) page: PageSurface,
    fonts: FontContext,
    font_ready: bool,
    sink: S,
    pub(crate) port: Handshake,
    pages_emitted: usize,
}

impl<S: PageSink> EscpPrinter<S> {
    /// Attach a printer.
    ///
    /// The page surface is sized from `config.page` and the printer starts
    /// in its reset state. A geometry that fails validation is replaced with
    /// US Letter.
    pub fn new(mut config: PrinterConfig, rasterizer: Box<dyn GlyphRasterizer>, sink: S) -> Self {
        info!("ESC/P: printer '{}' initializing", config.name);
        config.page = config.page.sanitized();

        let page = PageSurface::new(config.page.width_px(), config.page.height_px());
        let fonts = FontContext::new(rasterizer, config.font_dir.clone(), config.fonts.clone());
        let mut printer = Self {
            state: PrinterState::new(&config.page),
            config,
            page,
            fonts,
            font_ready: false,
            sink,
            port: Handshake::default(),
            pages_emitted: 0,
        };
        printer.reset();
        printer
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn state(&self) -> &PrinterState {
        &self.state
    }

    pub fn page(&self) -> &PageSurface {
        &self.page
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Pages handed to the sink so far.
    pub fn pages_emitted(&self) -> usize {
        self.pages_emitted
    }

    /// Whether a face is loaded and text will print.
    pub fn font_ready(&self) -> bool {
        self.font_ready
    }

    /// Restore the power-on state.
    ///
    /// The page surface is left alone, so a partly printed page still gets
    /// emitted.
    pub fn reset(&mut self) {
        self.state = PrinterState::new(&self.config.page);
        self.update_font();

        let s = &self.state;
        info!(
            "ESC/P: width={:.1}in height={:.1}in dpi={} cpi={} lpi={}",
            s.page_width, s.page_height, s.dpi, s.cpi, s.lpi
        );
    }

    /// Feed one byte from the host.
    pub fn handle_char(&mut self, byte: u8) {
        let ch = self.state.esc.msb.apply(byte);

        if self.state.bit_image.is_active() {
            if let Some(column) = self.state.bit_image.push(ch) {
                let s = &self.state;
                let advance = render_column(&mut self.page, s.dpi, s.curr_x, s.curr_y, &column);
                self.state.curr_x += advance;
            }
            return;
        }

        if self.state.esc.verbatim_remaining > 0 {
            self.state.esc.verbatim_remaining -= 1;
        } else if self.process_char(ch) {
            return;
        }

        self.print_glyph(ch);
    }

    /// Feed a run of bytes.
    pub fn write_all(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.handle_char(b);
        }
    }

    /// Emit the current page if anything was printed on it.
    pub fn close(&mut self) {
        if self.page.is_dirty() {
            self.flush();
        }
    }

    /// Recompute font metrics and re-select the face.
    pub(crate) fn update_font(&mut self) {
        let request = self.state.recompute_metrics();
        self.font_ready = self.fonts.select(&request);
    }

    /// Finish the current page and start a blank one.
    pub(crate) fn new_page(&mut self) {
        if self.page.is_dirty() {
            self.flush();
        }
        self.state.curr_y = self.state.top_margin;
        self.page.clear();
    }

    fn flush(&mut self) {
        match self.sink.emit(&self.page) {
            Ok(()) => self.pages_emitted += 1,
            Err(e) => error!("ESC/P: page discarded: {}", e),
        }
        self.page.clear();
    }

    /// Draw one character at the head and advance.
    fn print_glyph(&mut self, ch: u8) {
        if !self.font_ready {
            return;
        }
        let codepoint = self.state.cpmap[usize::from(ch)];
        let Some(glyph) = self.fonts.render(codepoint) else {
            return;
        };

        let style = self.state.style;
        let score = self.state.score;
        let (head_x, head_y) = self.state.head_px();

        let pen_x = head_x + glyph.left;
        let mut pen_y = head_y - glyph.top + glyph.ascender;
        if style.contains(Style::SUBSCRIPT) {
            pen_y += glyph.rows as i32 / 2;
        }

        if ch != b' ' || score != Score::None {
            self.page.mark_dirty();
        }

        self.page.blit(&glyph, pen_x, pen_y, Blend::Overwrite);
        if style.contains(Style::DOUBLE_STRIKE) {
            self.page.blit(&glyph, pen_x, pen_y + 1, Blend::Additive);
        }
        if style.contains(Style::BOLD) {
            self.page.blit(&glyph, pen_x + 1, pen_y, Blend::Additive);
        }

        if style.contains(Style::PROPORTIONAL) {
            self.state.curr_x += glyph.advance / f64::from(self.state.dpi);
        } else {
            self.state.curr_x += self.state.char_advance();
        }
        self.state.curr_x += self.state.extra_intra_space;

        if score == Score::None || !style.intersects(Style::SCORES) {
            return;
        }

        let line_end = self.state.to_px(self.state.curr_x);
        let mut line_y = head_y;
        if style.contains(Style::UNDERLINE) {
            line_y = pen_y + SCORE_GAP + glyph.rows as i32;
        }
        if style.contains(Style::STRIKETHROUGH) {
            line_y = head_y + glyph.ascender / 2;
        }
        if style.contains(Style::OVERSCORE) {
            line_y = head_y - if score.is_double() { SCORE_GAP } else { 0 };
        }

        let dpi = self.state.dpi;
        draw_hline(&mut self.page, dpi, pen_x, line_end, line_y, score.is_broken());
        if score.is_double() {
            draw_hline(&mut self.page, dpi, head_x, line_end, line_y + SCORE_GAP, score.is_broken());
        }
    }
}

impl<S: PageSink> Drop for EscpPrinter<S> {
    fn drop(&mut self) {
        self.close();
    }
}
