//! Minimal content-stream text renderer.
//!
//! Walks the postfix operator syntax of a (decoded) content stream and keeps only
//! what the text-showing operators print, breaking lines when the baseline moves:
//!
//! ```text
//! BT /F1 9 Tf 40 700 Td (15/01 FARMACIA ABC) Tj 300 0 Td (567,00) Tj
//!    0 -12 Td [(SUPER)-20(MERCADO XYZ)] TJ ET
//! ```
//!
//! renders as `15/01 FARMACIA ABC 567,00` and `SUPERMERCADO XYZ`.

use std::io::Read;

use flate2::read::ZlibDecoder;

/// TJ adjustments wider than this (thousandths of an em) read as a word gap.
const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Text origins closer than this vertically share a baseline.
const BASELINE_TOLERANCE: f64 = 0.5;

enum Operand {
    Number(f64),
    Text(Vec<u8>),
    Array(Vec<ArrayItem>),
    Other,
}

enum ArrayItem {
    Number(f64),
    Text(Vec<u8>),
}

/// Inflate a `/FlateDecode` stream body. Partial output from a truncated stream is kept.
pub(crate) fn inflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut output = Vec::new();

    match decoder.read_to_end(&mut output) {
        Ok(_) => Some(output),
        Err(e) if !output.is_empty() => {
            log::warn!(
                "FlateDecode partial recovery: {} bytes before error: {}",
                output.len(),
                e
            );
            Some(output)
        }
        Err(e) => {
            log::debug!("skipping stream that failed to inflate: {}", e);
            None
        }
    }
}

struct LineWriter {
    lines: Vec<String>,
    current: Vec<u8>,
    pending_space: bool,
    /// Vertical origin of the text line matrix, when known.
    y: Option<f64>,
    /// Baseline of the text in `current`.
    line_y: Option<f64>,
}

impl LineWriter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            pending_space: false,
            y: None,
            line_y: None,
        }
    }

    /// `BT` resets the text matrix; the line itself continues until a move
    /// to another baseline.
    fn begin_text(&mut self) {
        self.y = Some(0.0);
        self.gap();
    }

    /// Move the text origin to `y`. `flat` says the move is known to be
    /// horizontal when either baseline is unknown.
    fn move_to(&mut self, y: Option<f64>, flat: bool) {
        let same = match (self.line_y, y) {
            (Some(a), Some(b)) => (a - b).abs() < BASELINE_TOLERANCE,
            _ => flat,
        };
        if same {
            self.gap();
        } else {
            self.break_line();
            self.line_y = y;
        }
        self.y = y;
    }

    /// `T*`, `'` and `"` move down by the leading, which is not tracked.
    fn next_line(&mut self) {
        self.break_line();
        self.y = None;
        self.line_y = None;
    }

    fn push_text(&mut self, text: &[u8]) {
        if text.is_empty() {
            return;
        }
        if self.pending_space && !self.current.is_empty() && self.current.last() != Some(&b' ') {
            self.current.push(b' ');
        }
        self.pending_space = false;
        self.current.extend_from_slice(text);
    }

    fn gap(&mut self) {
        self.pending_space = true;
    }

    fn break_line(&mut self) {
        self.pending_space = false;
        if self.current.is_empty() {
            return;
        }
        let line: String = self.current.iter().map(|&b| b as char).collect();
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}

/// Render the text shown by a decoded content stream, one entry per text line.
pub(crate) fn render_text_lines(data: &[u8]) -> Vec<String> {
    let mut out = LineWriter::new();
    let mut operands: Vec<Operand> = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        match b {
            _ if is_whitespace(b) => i += 1,
            b'%' => {
                while i < data.len() && data[i] != b'\n' && data[i] != b'\r' {
                    i += 1;
                }
            }
            b'(' => {
                let (text, next) = read_literal(data, i + 1);
                operands.push(Operand::Text(text));
                i = next;
            }
            b'<' if data.get(i + 1) == Some(&b'<') => {
                operands.push(Operand::Other);
                i += 2;
            }
            b'>' => i += 1,
            b'<' => {
                let (text, next) = read_hex(data, i + 1);
                operands.push(Operand::Text(text));
                i = next;
            }
            b'[' => {
                let (items, next) = read_array(data, i + 1);
                operands.push(Operand::Array(items));
                i = next;
            }
            b']' | b'{' | b'}' | b')' => i += 1,
            b'/' => {
                i = skip_regular(data, i + 1);
                operands.push(Operand::Other);
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                let end = skip_regular(data, i);
                let number = std::str::from_utf8(&data[i..end])
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
                operands.push(number.map_or(Operand::Other, Operand::Number));
                i = end.max(i + 1);
            }
            _ => {
                let end = skip_regular(data, i).max(i + 1);
                let op = &data[i..end];
                i = end;

                if op == b"BI" {
                    i = skip_inline_image(data, i);
                } else {
                    apply_operator(op, &operands, &mut out);
                }
                operands.clear();
            }
        }
    }

    out.finish()
}

fn apply_operator(op: &[u8], operands: &[Operand], out: &mut LineWriter) {
    match op {
        b"Tj" => {
            if let Some(Operand::Text(t)) = operands.last() {
                out.push_text(t);
            }
        }
        b"'" | b"\"" => {
            out.next_line();
            if let Some(Operand::Text(t)) = operands.last() {
                out.push_text(t);
            }
        }
        b"TJ" => {
            if let Some(Operand::Array(items)) = operands.last() {
                for item in items {
                    match item {
                        ArrayItem::Text(t) => out.push_text(t),
                        ArrayItem::Number(n) if n.abs() > TJ_SPACE_THRESHOLD => out.gap(),
                        ArrayItem::Number(_) => {}
                    }
                }
            }
        }
        b"Td" | b"TD" => {
            let ty = last_number(operands).unwrap_or(0.0);
            out.move_to(out.y.map(|y| y + ty), ty == 0.0);
        }
        b"Tm" => out.move_to(last_number(operands), false),
        b"T*" => out.next_line(),
        b"BT" => out.begin_text(),
        _ => {}
    }
}

fn last_number(operands: &[Operand]) -> Option<f64> {
    operands.iter().rev().find_map(|o| match o {
        Operand::Number(n) => Some(*n),
        _ => None,
    })
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\0')
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn skip_regular(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && !is_whitespace(data[i]) && !is_delimiter(data[i]) {
        i += 1;
    }
    i
}

/// Read a literal string body starting just after `(`. Returns the bytes and
/// the index after the closing `)`.
fn read_literal(data: &[u8], mut i: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut depth = 1;

    while i < data.len() {
        let b = data[i];
        i += 1;
        match b {
            b'\\' => {
                let Some(&esc) = data.get(i) else { break };
                i += 1;
                match esc {
                    b'n' => out.push(b'\n'),
                    b'r' => out.push(b'\r'),
                    b't' => out.push(b'\t'),
                    b'b' => out.push(0x08),
                    b'f' => out.push(0x0c),
                    b'0'..=b'7' => {
                        let mut value = u32::from(esc - b'0');
                        let mut digits = 1;
                        while digits < 3 {
                            match data.get(i) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + u32::from(d - b'0');
                                    i += 1;
                                    digits += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value & 0xff) as u8);
                    }
                    b'\r' => {
                        if data.get(i) == Some(&b'\n') {
                            i += 1;
                        }
                    }
                    b'\n' => {}
                    other => out.push(other),
                }
            }
            b'(' => {
                depth += 1;
                out.push(b);
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                out.push(b);
            }
            _ => out.push(b),
        }
    }

    (out, i)
}

/// Read a hex string body starting just after `<`.
fn read_hex(data: &[u8], mut i: usize) -> (Vec<u8>, usize) {
    let mut nibbles = Vec::new();
    while i < data.len() && data[i] != b'>' {
        if let Some(v) = (data[i] as char).to_digit(16) {
            nibbles.push(v as u8);
        }
        i += 1;
    }
    if nibbles.len() % 2 == 1 {
        nibbles.push(0);
    }
    let bytes = nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect();
    (bytes, (i + 1).min(data.len()))
}

fn read_array(data: &[u8], mut i: usize) -> (Vec<ArrayItem>, usize) {
    let mut items = Vec::new();

    while i < data.len() {
        let b = data[i];
        match b {
            b']' => return (items, i + 1),
            b'(' => {
                let (text, next) = read_literal(data, i + 1);
                items.push(ArrayItem::Text(text));
                i = next;
            }
            b'<' => {
                let (text, next) = read_hex(data, i + 1);
                items.push(ArrayItem::Text(text));
                i = next;
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                let end = skip_regular(data, i).max(i + 1);
                if let Some(n) = std::str::from_utf8(&data[i..end])
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                {
                    items.push(ArrayItem::Number(n));
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    (items, i)
}

/// Skip `BI ... ID <binary> EI`, returning the index after `EI`.
fn skip_inline_image(data: &[u8], start: usize) -> usize {
    let Some(id) = find_token(data, start, b"ID") else {
        return data.len();
    };
    find_token(data, id + 2, b"EI").map_or(data.len(), |ei| ei + 2)
}

/// Position of `token` surrounded by whitespace (or buffer edges) at or after `from`.
fn find_token(data: &[u8], from: usize, token: &[u8]) -> Option<usize> {
    (from..data.len().saturating_sub(token.len() - 1)).find(|&p| {
        &data[p..p + token.len()] == token
            && (p == 0 || is_whitespace(data[p - 1]))
            && data.get(p + token.len()).is_none_or(|&b| is_whitespace(b))
    })
}
