//! Syntax highlighting of file revisions with tree-sitter.
//!
//! A revision is highlighted once, as a whole, and the events are cut into
//! per-line spans that the detail pane looks up by new-side line number.

use std::collections::HashMap;

use parking_lot::Mutex;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent};

use crate::core::RelPath;

/// Revisions above this size are shown without highlighting.
pub const MAX_HIGHLIGHT_BYTES: usize = 2 * 1024 * 1024;

/// Grammar used for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// Rust.
    #[cfg(feature = "lang-rust")]
    Rust,
    /// TypeScript and JavaScript.
    #[cfg(feature = "lang-typescript")]
    TypeScript,
    /// TSX and JSX.
    #[cfg(feature = "lang-typescript")]
    Tsx,
    /// Go.
    #[cfg(feature = "lang-go")]
    Go,
    /// Python.
    #[cfg(feature = "lang-python")]
    Python,
    /// JSON.
    #[cfg(feature = "lang-json")]
    Json,
    /// YAML.
    #[cfg(feature = "lang-yaml")]
    Yaml,
    /// Shell scripts.
    #[cfg(feature = "lang-bash")]
    Bash,
    /// Anything else; shown unstyled.
    Plain,
}

impl LanguageId {
    /// Pick a grammar from the path's extension.
    pub fn from_path(path: &RelPath) -> Self {
        let Some(ext) = path.extension() else {
            return Self::Plain;
        };
        match ext.to_ascii_lowercase().as_str() {
            #[cfg(feature = "lang-rust")]
            "rs" => Self::Rust,
            #[cfg(feature = "lang-typescript")]
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Self::TypeScript,
            #[cfg(feature = "lang-typescript")]
            "tsx" | "jsx" => Self::Tsx,
            #[cfg(feature = "lang-go")]
            "go" => Self::Go,
            #[cfg(feature = "lang-python")]
            "py" | "pyi" => Self::Python,
            #[cfg(feature = "lang-json")]
            "json" => Self::Json,
            #[cfg(feature = "lang-yaml")]
            "yaml" | "yml" => Self::Yaml,
            #[cfg(feature = "lang-bash")]
            "sh" | "bash" | "zsh" => Self::Bash,
            _ => Self::Plain,
        }
    }

    fn grammar(self) -> Option<(tree_sitter::Language, &'static str)> {
        let grammar: (tree_sitter::Language, &'static str) = match self {
            #[cfg(feature = "lang-rust")]
            Self::Rust => (tree_sitter_rust::LANGUAGE.into(), tree_sitter_rust::HIGHLIGHTS_QUERY),
            #[cfg(feature = "lang-typescript")]
            Self::TypeScript => (
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-typescript")]
            Self::Tsx => (
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-go")]
            Self::Go => (tree_sitter_go::LANGUAGE.into(), tree_sitter_go::HIGHLIGHTS_QUERY),
            #[cfg(feature = "lang-python")]
            Self::Python => (
                tree_sitter_python::LANGUAGE.into(),
                tree_sitter_python::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-json")]
            Self::Json => (tree_sitter_json::LANGUAGE.into(), tree_sitter_json::HIGHLIGHTS_QUERY),
            #[cfg(feature = "lang-yaml")]
            Self::Yaml => (tree_sitter_yaml::LANGUAGE.into(), tree_sitter_yaml::HIGHLIGHTS_QUERY),
            #[cfg(feature = "lang-bash")]
            Self::Bash => (tree_sitter_bash::LANGUAGE.into(), tree_sitter_bash::HIGHLIGHT_QUERY),
            Self::Plain => return None,
        };
        Some(grammar)
    }
}

/// Syntax class of a span; the theme maps each to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleId {
    /// Unstyled text.
    #[default]
    Default,
    /// Keywords.
    Keyword,
    /// Type names.
    Type,
    /// Functions, methods and constructors.
    Function,
    /// String literals.
    String,
    /// Numeric literals.
    Number,
    /// Comments.
    Comment,
    /// Operators.
    Operator,
    /// Brackets and delimiters.
    Punctuation,
    /// Constants.
    Constant,
    /// Properties and attributes.
    Property,
}

/// Capture names registered with tree-sitter, in highlight-index order.
const CAPTURES: &[(&str, StyleId)] = &[
    ("attribute", StyleId::Property),
    ("comment", StyleId::Comment),
    ("constant", StyleId::Constant),
    ("constant.builtin", StyleId::Constant),
    ("constructor", StyleId::Function),
    ("function", StyleId::Function),
    ("function.builtin", StyleId::Function),
    ("function.method", StyleId::Function),
    ("keyword", StyleId::Keyword),
    ("number", StyleId::Number),
    ("operator", StyleId::Operator),
    ("property", StyleId::Property),
    ("punctuation", StyleId::Punctuation),
    ("punctuation.bracket", StyleId::Punctuation),
    ("punctuation.delimiter", StyleId::Punctuation),
    ("string", StyleId::String),
    ("type", StyleId::Type),
    ("type.builtin", StyleId::Type),
];

/// A styled byte range within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Byte start, relative to the line.
    pub start: usize,
    /// Byte end, relative to the line.
    pub end: usize,
    /// Syntax class.
    pub style_id: StyleId,
}

/// Highlights whole revisions.
///
/// Grammar configurations are built on first use of a language and kept;
/// a grammar whose query fails to load is remembered as plain.
pub struct Highlighter {
    engine: Mutex<tree_sitter_highlight::Highlighter>,
    configs: Mutex<HashMap<LanguageId, Option<HighlightConfiguration>>>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Create a highlighter with no grammars loaded.
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(tree_sitter_highlight::Highlighter::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    fn highlight_into(&self, lang: LanguageId, source: &str, sink: &mut LineSink<'_>) -> bool {
        let mut configs = self.configs.lock();
        let Some(config) = configs.entry(lang).or_insert_with(|| load_config(lang)).as_ref() else {
            return false;
        };

        let mut engine = self.engine.lock();
        let events = match engine.highlight(config, source.as_bytes(), None, |_| None) {
            Ok(events) => events,
            Err(e) => {
                tracing::debug!(?lang, error = %e, "highlighting failed");
                return false;
            }
        };

        let mut styles = vec![StyleId::Default];
        let mut pos = 0;
        for event in events {
            match event {
                Ok(HighlightEvent::Source { start, end }) => {
                    let end = end.min(source.len());
                    let style = styles.last().copied().unwrap_or_default();
                    sink.push(start.max(pos), end, style);
                    pos = pos.max(end);
                }
                Ok(HighlightEvent::HighlightStart(h)) => {
                    let style = CAPTURES.get(h.0).map_or(StyleId::Default, |(_, s)| *s);
                    styles.push(style);
                }
                Ok(HighlightEvent::HighlightEnd) => {
                    styles.pop();
                }
                Err(e) => {
                    tracing::debug!(?lang, error = %e, "highlighting stopped early");
                    break;
                }
            }
        }
        sink.push(pos, source.len(), StyleId::Default);
        true
    }
}

fn load_config(lang: LanguageId) -> Option<HighlightConfiguration> {
    let (language, query) = lang.grammar()?;
    let mut config = match HighlightConfiguration::new(language, "source", query, "", "") {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(?lang, error = %e, "highlight query rejected");
            return None;
        }
    };
    let names: Vec<&str> = CAPTURES.iter().map(|(name, _)| *name).collect();
    config.configure(&names);
    Some(config)
}

/// Per-line spans of one revision.
///
/// Line `n` (0-indexed) is the `n`-th item of `str::lines()` over the same
/// text: spans never include the line break or a trailing `\r`. Every
/// non-empty line is covered end to end.
#[derive(Debug, Default)]
pub struct LineHighlights {
    lines: Vec<Vec<StyledSpan>>,
}

impl LineHighlights {
    /// Highlight `source` as `lang`. Large or unknown files come back unstyled.
    pub fn compute(highlighter: &Highlighter, lang: LanguageId, source: &str) -> Self {
        let mut sink = LineSink::new(source);
        let styled = lang != LanguageId::Plain
            && source.len() <= MAX_HIGHLIGHT_BYTES
            && highlighter.highlight_into(lang, source, &mut sink);
        if !styled {
            sink = LineSink::new(source);
            sink.push(0, source.len(), StyleId::Default);
        }
        Self {
            lines: sink.finish(),
        }
    }

    /// Spans for a line (0-indexed).
    pub fn line_spans(&self, line_idx: usize) -> Option<&[StyledSpan]> {
        self.lines.get(line_idx).map(Vec::as_slice)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cuts ordered byte ranges of a source into line-relative spans.
struct LineSink<'a> {
    bytes: &'a [u8],
    lines: Vec<Vec<StyledSpan>>,
    current: Vec<StyledSpan>,
    line_start: usize,
}

impl<'a> LineSink<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            lines: Vec::new(),
            current: Vec::new(),
            line_start: 0,
        }
    }

    fn push(&mut self, mut start: usize, end: usize, style: StyleId) {
        while start < end {
            match self.bytes[start..end].iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    let newline = start + offset;
                    self.extend(start, newline, style);
                    self.end_line(newline);
                    start = newline + 1;
                }
                None => {
                    self.extend(start, end, style);
                    start = end;
                }
            }
        }
    }

    fn extend(&mut self, start: usize, end: usize, style: StyleId) {
        if start >= end {
            return;
        }
        let (start, end) = (start - self.line_start, end - self.line_start);
        match self.current.last_mut() {
            Some(last) if last.style_id == style && last.end == start => last.end = end,
            _ => self.current.push(StyledSpan {
                start,
                end,
                style_id: style,
            }),
        }
    }

    /// Close the line whose break (or end of text) is at `at`.
    fn end_line(&mut self, at: usize) {
        let mut len = at - self.line_start;
        if len > 0 && self.bytes[at - 1] == b'\r' {
            len -= 1;
        }
        let mut spans = std::mem::take(&mut self.current);
        spans.retain_mut(|span| {
            span.end = span.end.min(len);
            span.start < span.end
        });
        self.lines.push(spans);
        self.line_start = at + 1;
    }

    fn finish(mut self) -> Vec<Vec<StyledSpan>> {
        if self.line_start < self.bytes.len() {
            self.end_line(self.bytes.len());
        }
        self.lines
    }
}
