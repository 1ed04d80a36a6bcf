//! Escape-aware text measurement and chunking.
//!
//! Both [`remove_ansi_codes`] and the chunker behind `Surface::write` share
//! [`escape_len`], so a sequence that is stripped for measurement is exactly
//! a sequence that is treated as zero-width while clipping.

use unicode_width::UnicodeWidthChar;

const ESC: char = '\u{1b}';
const CSI: char = '\u{9b}';
const BEL: char = '\u{7}';

fn is_introducer(c: char) -> bool {
    matches!(c, '[' | ']' | '(' | ')' | '#' | ';' | '?')
}

/// Window titles and hyperlinks carry free text up to the BEL.
fn is_osc_body(c: char) -> bool {
    !c.is_control()
}

/// Final byte of a CSI sequence: `[0-9A-PR-TZcf-nq-uy=><~]`.
fn is_final(c: char) -> bool {
    matches!(c,
        '0'..='9' | 'A'..='P' | 'R'..='T' | 'Z' | 'c' | 'f'..='n' | 'q'..='u' | 'y'
        | '=' | '>' | '<' | '~')
}

/// Byte length of the escape sequence starting at the beginning of `text`,
/// or `None` if `text` does not start with one.
pub fn escape_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    match chars.next() {
        Some((_, ESC)) | Some((_, CSI)) => {}
        _ => return None,
    }

    let mut osc = false;
    while let Some(&(_, c)) = chars.peek() {
        if !is_introducer(c) {
            break;
        }
        osc |= c == ']';
        chars.next();
    }
    let body_start = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());

    // OSC form: `]` then printable text terminated by BEL.
    let body = &text[body_start..];
    if osc {
        if let Some((i, _)) = body
            .char_indices()
            .find(|&(_, c)| !is_osc_body(c))
            .filter(|&(_, c)| c == BEL)
        {
            return Some(body_start + i + BEL.len_utf8());
        }
    }

    // CSI form: up to four digits, then `;`-separated groups of up to four.
    let bytes = body.as_bytes();
    let mut pos = 0;
    let mut last_digit = None;
    let mut run = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'0'..=b'9' if run < 4 => {
                run += 1;
                last_digit = Some(pos);
            }
            b';' if last_digit.is_some() => run = 0,
            _ => break,
        }
        pos += 1;
    }

    if let Some(c) = body[pos..].chars().next() {
        if is_final(c) {
            return Some(body_start + pos + c.len_utf8());
        }
    }

    // Nothing valid follows the parameters: the last digit is the final byte.
    last_digit.map(|d| body_start + d + 1)
}

/// Strip every escape sequence, leaving only printable text.
pub fn remove_ansi_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match escape_len(rest) {
            Some(len) => rest = &rest[len..],
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Display width of `text`, ignoring escape sequences.
pub fn printable_width(text: &str) -> usize {
    remove_ansi_codes(text)
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Split `text` into lines of at most `max_width` display columns.
///
/// Embedded newlines always end a chunk and empty lines yield nothing.
/// Characters wider than `max_width` are dropped so no chunk ever exceeds
/// it. Escape sequences never split and count as zero width; a run of them with
/// no printable text is carried into the following chunk (or appended to the
/// last one at the end of input).
pub fn chunk_lines(text: &str, max_width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if max_width == 0 {
        return chunks;
    }

    let mut current = String::new();
    let mut width = 0;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some(len) = escape_len(rest) {
            current.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }
        rest = &rest[c.len_utf8()..];

        if c == '\n' {
            if width > 0 {
                chunks.push(std::mem::take(&mut current));
                width = 0;
            }
            continue;
        }

        let w = c.width().unwrap_or(0);
        if w > max_width {
            // Cannot fit on any line of this width.
            continue;
        }
        if width > 0 && width + w > max_width {
            chunks.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push(c);
        width += w;
    }

    if width > 0 {
        chunks.push(current);
    } else if !current.is_empty() {
        if let Some(last) = chunks.last_mut() {
            last.push_str(&current);
        }
    }
    chunks
}
