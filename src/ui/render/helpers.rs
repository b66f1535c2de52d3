//! Shared rendering helpers and constants.

use ratatui::style::{Color, Style};
use ratatui::text::Span;

use crate::core::InlineSpan;
use crate::highlight::StyleId;
use crate::theme::Theme;

/// Gutter: 4 (old) + 1 + 4 (new) + 1 (separator) + 1 (marker) + 1 = 12 chars
pub const GUTTER_WIDTH: usize = 12;

/// Tab stop width for display alignment.
pub const TAB_WIDTH: usize = 8;

/// Timestamp format used in the commit list and header.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map StyleId to syntax color using theme.
pub fn style_to_color(style: StyleId, theme: &Theme) -> Color {
    match style {
        StyleId::Default => theme.text_normal,
        StyleId::Keyword => theme.syn_keyword,
        StyleId::Type => theme.syn_type,
        StyleId::Function => theme.syn_function,
        StyleId::String => theme.syn_string,
        StyleId::Number => theme.syn_number,
        StyleId::Comment => theme.syn_comment,
        StyleId::Operator => theme.syn_operator,
        StyleId::Punctuation => theme.syn_punctuation,
        StyleId::Constant => theme.syn_constant,
        StyleId::Property => theme.syn_property,
    }
}

/// Sanitize control characters.
pub fn sanitize_char(c: char) -> char {
    match c {
        '\x00'..='\x1f' | '\x7f' => '\u{FFFD}',
        _ => c,
    }
}

fn tab_width_at(col: usize) -> usize {
    TAB_WIDTH - col % TAB_WIDTH
}

pub fn is_muted_color(color: Color) -> bool {
    match color {
        Color::Rgb(r, g, b) => {
            let luminance = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            let saturation = if max == 0 {
                0
            } else {
                u32::from(max - min) * 100 / u32::from(max)
            };
            luminance < 140 || (luminance < 180 && saturation < 30)
        }
        Color::DarkGray | Color::Gray => true,
        _ => false,
    }
}

/// Keep emphasized text readable on the stronger inline background.
pub fn boost_muted_fg(fg: Color, default_fg: Color) -> Color {
    if is_muted_color(fg) {
        default_fg
    } else {
        fg
    }
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len == 0 {
        String::new()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}

/// Pad `spans` with `bg` up to `width` columns.
pub fn pad_to_width(spans: &mut Vec<Span<'static>>, width: usize, bg: Color) {
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    if used < width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(bg),
        ));
    }
}

/// Builder for efficient span construction.
pub struct SpanBuilder {
    spans: Vec<Span<'static>>,
    pending_style: Option<Style>,
    pending_text: String,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            pending_style: None,
            pending_text: String::new(),
        }
    }

    fn switch_style(&mut self, style: Style) {
        if self.pending_style != Some(style) {
            self.flush();
            self.pending_style = Some(style);
        }
    }

    pub fn push_char(&mut self, ch: char, style: Style) {
        self.switch_style(style);
        self.pending_text.push(ch);
    }

    pub fn push_spaces(&mut self, count: usize, style: Style) {
        if count == 0 {
            return;
        }
        self.switch_style(style);
        self.pending_text.extend(std::iter::repeat(' ').take(count));
    }

    fn flush(&mut self) {
        if !self.pending_text.is_empty() {
            let style = self.pending_style.unwrap_or_default();
            self.spans
                .push(Span::styled(std::mem::take(&mut self.pending_text), style));
        }
    }

    pub fn finish(mut self) -> Vec<Span<'static>> {
        self.flush();
        self.spans
    }
}

impl Default for SpanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes one line of code into a horizontally scrolled, width-limited window.
///
/// Tabs expand to the next tab stop; columns left of `scroll_x` are dropped.
pub struct ClippedLine {
    builder: SpanBuilder,
    scroll_x: usize,
    max_width: usize,
    col: usize,
    visible: usize,
}

impl ClippedLine {
    pub fn new(scroll_x: usize, max_width: usize) -> Self {
        Self {
            builder: SpanBuilder::new(),
            scroll_x,
            max_width,
            col: 0,
            visible: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.visible >= self.max_width
    }

    pub fn push_str(&mut self, text: &str, style: Style) {
        for ch in text.chars() {
            if self.is_full() {
                break;
            }
            self.push_char(ch, style);
        }
    }

    /// Push `text`, which starts at byte `start` of its line, switching to the
    /// emphasis background inside changed `spans`.
    pub fn push_emphasized(
        &mut self,
        text: &str,
        start: usize,
        spans: &[InlineSpan],
        normal: Style,
        emphasis: Style,
    ) {
        let mut offset = start;
        for ch in text.chars() {
            if self.is_full() {
                break;
            }
            let changed = spans
                .iter()
                .any(|s| s.changed && offset >= s.start && offset < s.end);
            self.push_char(ch, if changed { emphasis } else { normal });
            offset += ch.len_utf8();
        }
    }

    fn push_char(&mut self, ch: char, style: Style) {
        if ch == '\t' {
            let width = tab_width_at(self.col);
            let skip = self.scroll_x.saturating_sub(self.col).min(width);
            let emit = (width - skip).min(self.max_width - self.visible);
            self.builder.push_spaces(emit, style);
            self.visible += emit;
            self.col += width;
            return;
        }

        if self.col >= self.scroll_x {
            self.builder.push_char(sanitize_char(ch), style);
            self.visible += 1;
        }
        self.col += 1;
    }

    pub fn finish(self) -> Vec<Span<'static>> {
        self.builder.finish()
    }
}
