//! Advance widths of the standard Helvetica faces, from the Adobe AFM files.
//!
//! Widths are in 1/1000 of the font size. Only the faces the report uses
//! are carried.

/// Metrics for one standard Type1 face.
pub struct StandardFontMetrics {
    /// Widths for U+0020 through U+007E.
    ascii: &'static [u16; 95],
    /// Widths of the WinAnsi punctuation the report can meet.
    extra: &'static [(char, u16)],
    default_width: u16,
}

#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

const HELVETICA_EXTRA: &[(char, u16)] = &[
    ('\u{a0}', 278),
    ('¡', 333),
    ('¿', 611),
    ('°', 400),
    ('·', 278),
    ('«', 556),
    ('»', 556),
    ('€', 556),
    ('–', 556),
    ('—', 1000),
    ('…', 1000),
    ('•', 350),
    ('‘', 222),
    ('’', 222),
    ('“', 333),
    ('”', 333),
];

const HELVETICA_BOLD_EXTRA: &[(char, u16)] = &[
    ('\u{a0}', 278),
    ('¡', 333),
    ('¿', 611),
    ('°', 400),
    ('·', 278),
    ('«', 556),
    ('»', 556),
    ('€', 556),
    ('–', 556),
    ('—', 1000),
    ('…', 1000),
    ('•', 350),
    ('‘', 278),
    ('’', 278),
    ('“', 500),
    ('”', 500),
];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_ASCII,
    extra: HELVETICA_EXTRA,
    default_width: 556,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: &HELVETICA_BOLD_ASCII,
    extra: HELVETICA_BOLD_EXTRA,
    default_width: 556,
};

/// Accented Latin letters share the advance of their base letter.
fn base_letter(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

impl StandardFontMetrics {
    /// Advance width in thousandths of the font size.
    pub fn width_units(&self, ch: char) -> u16 {
        let ch = base_letter(ch).unwrap_or(ch);
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            return self.ascii[(code - 0x20) as usize];
        }
        self.extra
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, w)| *w)
            .unwrap_or(self.default_width)
    }

    /// Advance width of one character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.width_units(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}
