// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsiEncoding for the built-in Helvetica overlay font.
//
// Base-14 fonts only cover the Windows-1252 repertoire, so every overlay line
// is encoded up front; a line holding a character outside it cannot be drawn.

/// Code points 0x80..=0x9F that Windows-1252 assigns to printable glyphs.
const CP1252_HIGH: [(u8, char); 27] = [
    (0x80, '€'),
    (0x82, '‚'),
    (0x83, 'ƒ'),
    (0x84, '„'),
    (0x85, '…'),
    (0x86, '†'),
    (0x87, '‡'),
    (0x88, 'ˆ'),
    (0x89, '‰'),
    (0x8A, 'Š'),
    (0x8B, '‹'),
    (0x8C, 'Œ'),
    (0x8E, 'Ž'),
    (0x91, '‘'),
    (0x92, '’'),
    (0x93, '“'),
    (0x94, '”'),
    (0x95, '•'),
    (0x96, '–'),
    (0x97, '—'),
    (0x98, '˜'),
    (0x99, '™'),
    (0x9A, 'š'),
    (0x9B, '›'),
    (0x9C, 'œ'),
    (0x9E, 'ž'),
    (0x9F, 'Ÿ'),
];

/// Encode `text` as WinAnsi bytes. Tabs become spaces. Returns the first
/// character that has no WinAnsi code.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, char> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            _ => CP1252_HIGH
                .iter()
                .find(|(_, glyph)| *glyph == c)
                .map(|(code, _)| *code)
                .ok_or(c)?,
        };
        out.push(byte);
    }
    Ok(out)
}

/// Decode WinAnsi bytes. Unassigned codes become U+FFFD.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x20..=0x7E | 0xA0..=0xFF => b as char,
            0x80..=0x9F => CP1252_HIGH
                .iter()
                .find(|(code, _)| *code == b)
                .map_or('\u{FFFD}', |(_, glyph)| *glyph),
            b'\t' | b'\n' | b'\r' => b as char,
            _ => '\u{FFFD}',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_latin1_round_trip() {
        let text = "Façade détail — 26437-RIA-001 “A1” €5";
        let bytes = encode_win_ansi(text).unwrap();
        assert_eq!(bytes.len(), text.chars().count());
        assert_eq!(decode_win_ansi(&bytes), text);
    }

    #[test]
    fn unencodable_character_reported() {
        assert_eq!(encode_win_ansi("arrow → here"), Err('→'));
        assert_eq!(encode_win_ansi("平面図"), Err('平'));
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(encode_win_ansi("a\tb").unwrap(), b"a b");
    }

    #[test]
    fn control_characters_rejected() {
        assert_eq!(encode_win_ansi("bell\u{7}"), Err('\u{7}'));
    }
}
