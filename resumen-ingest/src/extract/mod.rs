//! Best-effort PDF-to-text without a PDF object model.
//!
//! The raw bytes are scanned in passes of decreasing precision and the
//! results concatenated:
//!
//! 1. literal strings `(...)` anywhere in the file, space-joined
//! 2. printable residue of every `stream ... endstream` block
//! 3. text operators of uncompressed and `/FlateDecode` content streams,
//!    one line per text line
//! 4. only when the above yield almost nothing: `[(Hel)(lo)]` arrays with
//!    their fragments glued back together
//!
//! A stream rendered by pass 3 is left out of passes 1 and 2: its strings
//! would otherwise reappear as one page-long line.
//!
//! Pass 4 joins fragments with no separator, which repairs words split by
//! kerning but can also merge unrelated words.

mod content;

use std::borrow::Cow;
use std::ops::Range;

use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use crate::error::ExtractError;

/// How far back from a `stream` keyword to look for its dictionary.
const DICT_LOOKBEHIND: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Render text operators from content streams (inflating `/FlateDecode` ones).
    pub inflate_streams: bool,
    /// Printable stream residue at or below this length is binary noise.
    pub min_stream_chars: usize,
    /// Non-whitespace length under which the bracket fallback runs.
    pub fallback_threshold: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            inflate_streams: true,
            min_stream_chars: 20,
            fallback_threshold: 50,
        }
    }
}

impl ExtractOptions {
    /// Only the regex passes over the raw bytes.
    pub fn raw_only() -> Self {
        Self {
            inflate_streams: false,
            ..Self::default()
        }
    }
}

struct StreamBlock<'a> {
    dict: &'a [u8],
    data: &'a [u8],
    /// Position of `data` in the file.
    span: Range<usize>,
}

impl StreamBlock<'_> {
    fn has(&self, needle: &[u8]) -> bool {
        self.dict.windows(needle.len()).any(|w| w == needle)
    }

    fn is_flate(&self) -> bool {
        self.has(b"/FlateDecode")
    }

    fn is_image(&self) -> bool {
        self.has(b"/Image") || self.has(b"/DCTDecode") || self.has(b"/JPXDecode")
    }

    fn has_filter(&self) -> bool {
        self.has(b"/Filter")
    }
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    options: ExtractOptions,
    paren_re: Regex,
    bracket_re: Regex,
    fragment_re: Regex,
    whitespace_re: Regex,
    stream_re: BytesRegex,
    encrypt_re: BytesRegex,
}

impl TextExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            options,
            paren_re: Regex::new(r"\(([^)]+)\)")?,
            bracket_re: Regex::new(r"\[([^\]]+)\]")?,
            fragment_re: Regex::new(r"\(([^)]*)\)")?,
            whitespace_re: Regex::new(r"\s+")?,
            stream_re: BytesRegex::new(r"(?s-u)stream\r?\n(.*?)endstream")?,
            encrypt_re: BytesRegex::new(r"(?-u)/Encrypt\s*(?:\d+\s+\d+\s+R|<<)")?,
        })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract plain text from raw PDF bytes.
    pub fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::Empty);
        }
        if self.encrypt_re.is_match(bytes) {
            return Err(ExtractError::Encrypted);
        }

        let text = latin1(bytes);
        let blocks = self.stream_blocks(bytes);

        let mut rendered = Vec::new();
        let mut raw_blocks = Vec::new();
        let mut masked: Option<Vec<u8>> = None;
        for block in &blocks {
            match self.render_block(block) {
                Some(lines) => {
                    masked.get_or_insert_with(|| bytes.to_vec())[block.span.clone()].fill(b' ');
                    rendered.extend(lines);
                }
                None => raw_blocks.push(block),
            }
        }
        log::debug!(
            "content pass rendered {} text lines from {} of {} blocks",
            rendered.len(),
            blocks.len() - raw_blocks.len(),
            blocks.len()
        );

        let scan: Cow<'_, str> = match &masked {
            Some(m) => Cow::Owned(latin1(m)),
            None => Cow::Borrowed(text.as_str()),
        };
        let mut parts = vec![self.parenthesis_pass(&scan)];
        let residue: Vec<String> = raw_blocks
            .iter()
            .filter_map(|b| self.stream_residue(b))
            .collect();
        log::debug!("stream pass kept {} of {} blocks", residue.len(), raw_blocks.len());
        parts.extend(residue);
        parts.extend(rendered);
        parts.retain(|p| !p.is_empty());

        let mut working = parts.join("\n");

        if non_whitespace_len(&working) < self.options.fallback_threshold {
            log::warn!("little text recovered; trying bracket fallback");
            let fallback = self.bracket_pass(&text);
            if !fallback.is_empty() {
                working.push('\n');
                working.push_str(&fallback);
            }
        }

        Ok(working)
    }

    fn parenthesis_pass(&self, text: &str) -> String {
        self.paren_re
            .captures_iter(text)
            .map(|c| c.get(1).map_or("", |m| m.as_str()))
            .filter(|s| s.chars().count() > 1 && s.chars().any(|c| c.is_ascii_alphanumeric()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn stream_blocks<'a>(&self, bytes: &'a [u8]) -> Vec<StreamBlock<'a>> {
        self.stream_re
            .captures_iter(bytes)
            .filter_map(|c| {
                let whole = c.get(0)?;
                let body = c.get(1)?;
                let data = body.as_bytes();
                let window = &bytes[whole.start().saturating_sub(DICT_LOOKBEHIND)..whole.start()];
                let dict = window
                    .windows(3)
                    .rposition(|w| w == b"obj")
                    .map_or(window, |p| &window[p + 3..]);
                Some(StreamBlock {
                    dict,
                    data,
                    span: body.range(),
                })
            })
            .collect()
    }

    fn stream_residue(&self, block: &StreamBlock<'_>) -> Option<String> {
        let printable: String = block
            .data
            .iter()
            .map(|&b| match b {
                0x20..=0x7e | b'\n' | b'\r' => b as char,
                _ => ' ',
            })
            .collect();
        let collapsed = self.whitespace_re.replace_all(&printable, " ");
        let cleaned = collapsed.trim();
        (cleaned.len() > self.options.min_stream_chars).then(|| cleaned.to_string())
    }

    /// Text lines of a content stream, or `None` when the stream is not
    /// rendered (pass disabled, image, unsupported filter, no text).
    fn render_block(&self, block: &StreamBlock<'_>) -> Option<Vec<String>> {
        if !self.options.inflate_streams || block.is_image() {
            return None;
        }

        let decoded = if block.is_flate() {
            content::inflate(trim_eol(block.data))?
        } else if block.has_filter() {
            return None;
        } else {
            block.data.to_vec()
        };

        if !decoded.windows(2).any(|w| w == b"BT") {
            return None;
        }
        let lines = content::render_text_lines(&decoded);
        (!lines.is_empty()).then_some(lines)
    }

    fn bracket_pass(&self, text: &str) -> String {
        self.bracket_re
            .captures_iter(text)
            .filter_map(|group| {
                let inner = group.get(1)?.as_str();
                let joined: String = self
                    .fragment_re
                    .captures_iter(inner)
                    .filter_map(|f| f.get(1).map(|m| m.as_str()))
                    .collect();
                (!joined.is_empty()).then_some(joined)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract text with the default options.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    TextExtractor::new(ExtractOptions::default())?.extract(bytes)
}

/// One byte, one code point.
pub fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

fn trim_eol(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && matches!(data[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    &data[..end]
}
