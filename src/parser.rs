// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Statement parser and numeric literal parser for assembly source.

/// One parsed source line.
///
/// Line format: `[label:] [mnemonic [operand1[, operand2]]] [; comment]`.
/// The parser never rejects a line; malformed shapes surface later as
/// per-mnemonic operand checks. Empty fields are `None`, so a blank or
/// comment-only line parses to a statement with every field unset.
#[derive(Debug, Clone)]
pub struct Statement {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operand1: Option<String>,
    pub operand2: Option<String>,
    pub comment: Option<String>,
    /// Operand 1 came from a single-quoted literal (the `db` string form).
    pub is_string: bool,
    /// 1-based source line number.
    pub line: u32,
}

impl Statement {
    fn empty(line: u32) -> Self {
        Self {
            label: None,
            mnemonic: None,
            operand1: None,
            operand2: None,
            comment: None,
            is_string: false,
            line,
        }
    }
}

/// Parse one raw source line into a [`Statement`].
///
/// The input is never mutated; both assembly passes walk the same parsed
/// program.
pub fn parse(line: &str, line_num: u32) -> Statement {
    let mut stmt = Statement::empty(line_num);

    let text = trim(line);
    if text.is_empty() || text.starts_with(';') {
        return stmt;
    }

    let mut rest = match text.find(';') {
        Some(ix) => {
            stmt.comment = non_empty(&text[ix + 1..]);
            &text[..ix]
        }
        None => text,
    };

    let head;
    if let Some(open) = rest.find('\'') {
        // String literal form: everything before the quote is the
        // label/mnemonic portion and the quoted content is the sole
        // operand. Quotes are stripped; the content is kept verbatim.
        let body = &rest[open + 1..];
        let content = match body.find('\'') {
            Some(close) => &body[..close],
            None => body,
        };
        stmt.operand1 = Some(content.to_string());
        stmt.is_string = true;
        head = trim(&rest[..open]);
    } else {
        if let Some(comma) = rest.find(',') {
            stmt.operand2 = non_empty(&rest[comma + 1..]);
            rest = &rest[..comma];
        }
        let rest = trim(rest);
        match rest.rfind(is_space) {
            Some(pos) => {
                stmt.operand1 = non_empty(&rest[pos + 1..]);
                head = trim(&rest[..pos]);
            }
            None => head = rest,
        }
    }

    match head.find(':') {
        Some(colon) => {
            stmt.label = non_empty(&head[..colon]);
            stmt.mnemonic = non_empty(&head[colon + 1..]);
        }
        None => stmt.mnemonic = non_empty(head),
    }

    // `label: hlt` splits as label + operand with nothing between colon
    // and operand; the lone operand is really the mnemonic.
    if stmt.mnemonic.is_none() && !stmt.is_string && stmt.operand2.is_none() {
        stmt.mnemonic = stmt.operand1.take();
    }

    stmt
}

/// Parse a numeric literal token: a trailing `h`/`H` selects base 16 for
/// the preceding characters, otherwise base 10. Digits are consumed from
/// the front; trailing non-digits are ignored. Returns `None` when no
/// digit is consumed. Values wrap to 16 bits.
pub fn parse_number(token: &str) -> Option<u16> {
    let (digits, base) = match token.as_bytes().last() {
        Some(b'h' | b'H') => (&token[..token.len() - 1], 16u32),
        _ => (token, 10),
    };

    let mut value: u16 = 0;
    let mut consumed = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(base) else {
            break;
        };
        value = value.wrapping_mul(base as u16).wrapping_add(digit as u16);
        consumed = true;
    }

    if consumed {
        Some(value)
    } else {
        None
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0C' | '\r' | '\n' | '\x0B')
}

fn trim(s: &str) -> &str {
    s.trim_matches(is_space)
}

fn non_empty(s: &str) -> Option<String> {
    let s = trim(s);
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_number};
    use proptest::prelude::*;

    #[test]
    fn parses_label_mnemonic_and_operands() {
        let stmt = parse("start: mvi a, 5h ; load", 1);
        assert_eq!(stmt.label.as_deref(), Some("start"));
        assert_eq!(stmt.mnemonic.as_deref(), Some("mvi"));
        assert_eq!(stmt.operand1.as_deref(), Some("a"));
        assert_eq!(stmt.operand2.as_deref(), Some("5h"));
        assert_eq!(stmt.comment.as_deref(), Some("load"));
        assert!(!stmt.is_string);
    }

    #[test]
    fn blank_and_comment_lines_are_empty() {
        for line in ["", "   \t ", "; whole line comment", " ;x"] {
            let stmt = parse(line, 1);
            assert!(stmt.label.is_none());
            assert!(stmt.mnemonic.is_none());
            assert!(stmt.operand1.is_none());
            assert!(stmt.operand2.is_none());
        }
    }

    #[test]
    fn label_only_line() {
        let stmt = parse("loop:", 1);
        assert_eq!(stmt.label.as_deref(), Some("loop"));
        assert!(stmt.mnemonic.is_none());
        assert!(stmt.operand1.is_none());
    }

    #[test]
    fn label_with_bare_mnemonic() {
        // The operand slot captures "hlt" on the whitespace split; it must
        // come back as the mnemonic.
        let stmt = parse("target: hlt", 1);
        assert_eq!(stmt.label.as_deref(), Some("target"));
        assert_eq!(stmt.mnemonic.as_deref(), Some("hlt"));
        assert!(stmt.operand1.is_none());
    }

    #[test]
    fn string_operand_strips_quotes() {
        let stmt = parse("msg: db 'hi there' ; greeting", 1);
        assert_eq!(stmt.label.as_deref(), Some("msg"));
        assert_eq!(stmt.mnemonic.as_deref(), Some("db"));
        assert_eq!(stmt.operand1.as_deref(), Some("hi there"));
        assert!(stmt.operand2.is_none());
        assert!(stmt.is_string);
    }

    #[test]
    fn tab_separated_fields() {
        let stmt = parse("\tmov\ta,\tb", 1);
        assert!(stmt.label.is_none());
        assert_eq!(stmt.mnemonic.as_deref(), Some("mov"));
        assert_eq!(stmt.operand1.as_deref(), Some("a"));
        assert_eq!(stmt.operand2.as_deref(), Some("b"));
    }

    #[test]
    fn empty_second_operand_is_dropped() {
        let stmt = parse("mov a,", 1);
        assert_eq!(stmt.mnemonic.as_deref(), Some("mov"));
        assert_eq!(stmt.operand1.as_deref(), Some("a"));
        assert!(stmt.operand2.is_none());
    }

    #[test]
    fn parse_number_decimal_and_hex() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("0ffh"), Some(0xff));
        assert_eq!(parse_number("0FFH"), Some(0xff));
        assert_eq!(parse_number("100h"), Some(0x100));
    }

    #[test]
    fn parse_number_rejects_digitless_tokens() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("h"), None);
        assert_eq!(parse_number("label"), None);
    }

    #[test]
    fn parse_number_ignores_trailing_garbage() {
        assert_eq!(parse_number("12x"), Some(12));
        assert_eq!(parse_number("3fzz"), Some(3));
    }

    proptest! {
        #[test]
        fn parse_number_decimal_round_trip(value in any::<u16>()) {
            prop_assert_eq!(parse_number(&value.to_string()), Some(value));
        }

        #[test]
        fn parse_number_hex_round_trip(value in any::<u16>()) {
            let text = format!("{value:X}h");
            prop_assert_eq!(parse_number(&text), Some(value));
        }

        #[test]
        fn parse_number_wraps_past_16_bits(value in any::<u32>()) {
            prop_assert_eq!(parse_number(&value.to_string()), Some(value as u16));
        }
    }
}
