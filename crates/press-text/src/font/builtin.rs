//! Built-in Helvetica metrics
//!
//! Standard-14 Helvetica needs no font file, so it is the last resort when
//! font resolution finds nothing installed. Text is encoded as WinAnsi.
//! Widths are in 1/1000 em, from the Adobe AFM files.

/// Helvetica ascender in 1/1000 em
pub const BUILTIN_ASCENT: f32 = 718.0;
/// Helvetica descender in 1/1000 em (negative)
pub const BUILTIN_DESCENT: f32 = -207.0;

/// Widths of codes 32..=126
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// PostScript name of the standard-14 variant
pub fn builtin_name(bold: bool, italic: bool) -> &'static str {
    match (bold, italic) {
        (false, false) => "Helvetica",
        (true, false) => "Helvetica-Bold",
        (false, true) => "Helvetica-Oblique",
        (true, true) => "Helvetica-BoldOblique",
    }
}

/// WinAnsi code for a character; unmappable characters become `?`
pub fn winansi_code(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '\u{2026}' => 133,
        '\u{2018}' => 145,
        '\u{2019}' => 146,
        '\u{201C}' => 147,
        '\u{201D}' => 148,
        '\u{2022}' | '\u{25E6}' | '\u{25AA}' => 149,
        '\u{2013}' => 150,
        '\u{2014}' => 151,
        '\u{20AC}' => 128,
        '\t' | '\n' => b' ',
        _ => b'?',
    }
}

/// Advance of a WinAnsi code in 1/1000 em
pub fn builtin_advance(code: u8, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match code {
        32..=126 => table[(code - 32) as usize],
        133 | 151 => 1000,
        145 | 146 => if bold { 278 } else { 222 },
        147 | 148 => if bold { 500 } else { 333 },
        149 => 350,
        150 | 128 => 556,
        160 => 278,
        _ => 556,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(builtin_advance(b' ', false), 278);
        assert_eq!(builtin_advance(b'W', false), 944);
        assert_eq!(builtin_advance(b'i', false), 222);
        assert_eq!(builtin_advance(b'~', false), 584);
        assert_eq!(builtin_advance(b'b', true), 611);
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(winansi_code('A'), 65);
        assert_eq!(winansi_code('é'), 0xE9);
        assert_eq!(winansi_code('\u{2022}'), 149);
        assert_eq!(winansi_code('\u{4E2D}'), b'?');
    }

    #[test]
    fn test_names() {
        assert_eq!(builtin_name(true, true), "Helvetica-BoldOblique");
    }
}
