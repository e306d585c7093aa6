//! EditorDocument: block/inline document with a plain-text projection
//!
//! The document is the authoritative editor state. Hosts exchange the
//! plain-text projection: blocks joined by `\n`, line-break nodes also
//! serialized as `\n`. Every edit addresses char positions in that projection.
//!
//! HTML I/O mirrors what the JS editor consumes and produces: one `<p>` per
//! block, `<br>` for line breaks, `& < > " '` entity-escaped.

use crate::error::MentionError;
use crate::text::char_len;

/// Inline node inside a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    /// Explicit line break (Shift+Enter)
    HardBreak,
}

/// Paragraph-level node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub inlines: Vec<Inline>,
}

impl Block {
    fn push_char(&mut self, c: char) {
        match self.inlines.last_mut() {
            Some(Inline::Text(text)) => text.push(c),
            _ => self.inlines.push(Inline::Text(c.to_string())),
        }
    }

    fn push_text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.inlines.last_mut() {
            Some(Inline::Text(text)) => text.push_str(s),
            _ => self.inlines.push(Inline::Text(s.to_string())),
        }
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(text) => out.push_str(text),
                Inline::HardBreak => out.push('\n'),
            }
        }
        out
    }
}

/// Flat editing unit: one char of the projection each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char(char),
    Break,
    BlockEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDocument {
    /// Never empty
    blocks: Vec<Block>,
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorDocument {
    /// One empty paragraph
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
        }
    }

    /// One paragraph per line
    pub fn from_plain_text(text: &str) -> Self {
        let blocks = text
            .split('\n')
            .map(|line| {
                let mut block = Block::default();
                block.push_text(line);
                block
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Plain-text projection
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Projection length in chars
    pub fn len(&self) -> usize {
        let inline_len: usize = self
            .blocks
            .iter()
            .flat_map(|b| b.inlines.iter())
            .map(|inline| match inline {
                Inline::Text(text) => char_len(text),
                Inline::HardBreak => 1,
            })
            .sum();
        inline_len + self.blocks.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    fn units(&self) -> Vec<Unit> {
        let mut units = Vec::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                units.push(Unit::BlockEnd);
            }
            for inline in &block.inlines {
                match inline {
                    Inline::Text(text) => units.extend(text.chars().map(Unit::Char)),
                    Inline::HardBreak => units.push(Unit::Break),
                }
            }
        }
        units
    }

    fn rebuild(&mut self, units: &[Unit]) {
        let mut blocks = vec![Block::default()];
        for unit in units {
            match unit {
                Unit::Char(c) => {
                    if let Some(block) = blocks.last_mut() {
                        block.push_char(*c);
                    }
                }
                Unit::Break => {
                    if let Some(block) = blocks.last_mut() {
                        block.inlines.push(Inline::HardBreak);
                    }
                }
                Unit::BlockEnd => blocks.push(Block::default()),
            }
        }
        self.blocks = blocks;
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), MentionError> {
        let len = self.len();
        if start > end {
            return Err(MentionError::InvalidPosition { pos: start, len });
        }
        if end > len {
            return Err(MentionError::InvalidPosition { pos: end, len });
        }
        Ok(())
    }

    fn splice(&mut self, start: usize, end: usize, insert: Vec<Unit>) -> Result<usize, MentionError> {
        self.check_range(start, end)?;
        let inserted = insert.len();
        let mut units = self.units();
        units.splice(start..end, insert);
        self.rebuild(&units);
        Ok(start + inserted)
    }

    /// Replace `start..end` with text; `\n` splits paragraphs, `\r` is dropped.
    /// Returns the position right after the inserted text.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<usize, MentionError> {
        let insert = text
            .chars()
            .filter(|&c| c != '\r')
            .map(|c| if c == '\n' { Unit::BlockEnd } else { Unit::Char(c) })
            .collect();
        self.splice(start, end, insert)
    }

    pub fn insert_text(&mut self, at: usize, text: &str) -> Result<usize, MentionError> {
        self.replace(at, at, text)
    }

    pub fn delete(&mut self, start: usize, end: usize) -> Result<usize, MentionError> {
        self.splice(start, end, Vec::new())
    }

    /// Enter: split the paragraph at `at`
    pub fn split_block(&mut self, at: usize) -> Result<usize, MentionError> {
        self.splice(at, at, vec![Unit::BlockEnd])
    }

    /// Shift+Enter: line-break node at `at`
    pub fn insert_hard_break(&mut self, at: usize) -> Result<usize, MentionError> {
        self.splice(at, at, vec![Unit::Break])
    }

    // -------------------------------------------------------------------------
    // HTML
    // -------------------------------------------------------------------------

    /// Editor content: `<p>` per block, `<br>` per line break, text escaped
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for block in &self.blocks {
            html.push_str("<p>");
            for inline in &block.inlines {
                match inline {
                    Inline::Text(text) => html.push_str(&html_escape::encode_quoted_attribute(text)),
                    Inline::HardBreak => html.push_str("<br>"),
                }
            }
            html.push_str("</p>");
        }
        html
    }

    /// Parse editor HTML. Tags other than `p` and `br` are dropped, keeping their text.
    pub fn from_html(html: &str) -> Self {
        let mut blocks: Vec<Block> = Vec::new();
        let mut current: Option<Block> = None;
        let mut rest = html;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                append_text(&mut current, rest);
                break;
            };
            append_text(&mut current, &rest[..lt]);

            let Some(gt) = rest[lt..].find('>') else {
                // Unterminated tag: keep it as text
                append_text(&mut current, &rest[lt..]);
                break;
            };
            let tag = &rest[lt + 1..lt + gt];
            rest = &rest[lt + gt + 1..];

            let closing = tag.starts_with('/');
            let name = tag
                .trim_start_matches('/')
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();

            match (name.as_str(), closing) {
                ("p", false) => {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                    current = Some(Block::default());
                }
                ("p", true) => blocks.push(current.take().unwrap_or_default()),
                ("br", _) => current
                    .get_or_insert_with(Block::default)
                    .inlines
                    .push(Inline::HardBreak),
                _ => {}
            }
        }

        if let Some(block) = current {
            blocks.push(block);
        }
        if blocks.is_empty() {
            blocks.push(Block::default());
        }
        Self { blocks }
    }
}

fn append_text(current: &mut Option<Block>, raw: &str) {
    if raw.is_empty() {
        return;
    }
    // Formatting whitespace between paragraphs is not content
    if current.is_none() && raw.trim().is_empty() {
        return;
    }
    let decoded = html_escape::decode_html_entities(raw);
    current.get_or_insert_with(Block::default).push_text(&decoded);
}
