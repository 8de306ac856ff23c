//! Locale-aware number rendering.
//!
//! Rounding works on the shortest round-trip decimal representation of the
//! value, half away from zero, so `1.005` with two decimals renders `1.01`
//! the way spreadsheet users expect.

/// The separators and currency placement of one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    /// es-MX: `1,234.50`, `$` prefix.
    EsMx,
    /// en-US: `1,234.50`, `$` prefix.
    EnUs,
    /// es-ES: `12.345,50`, grouping from five integer digits, ` €` suffix.
    EsEs,
}

impl Locale {
    fn group_separator(self) -> char {
        match self {
            Locale::EsMx | Locale::EnUs => ',',
            Locale::EsEs => '.',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Locale::EsMx | Locale::EnUs => '.',
            Locale::EsEs => ',',
        }
    }

    /// Fewest integer digits that trigger grouping.
    fn min_grouping_digits(self) -> usize {
        match self {
            Locale::EsMx | Locale::EnUs => 4,
            Locale::EsEs => 5,
        }
    }
}

/// Digits of a rounded value: sign, integer part and fraction part.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Digits {
    negative: bool,
    int: String,
    frac: String,
}

/// Round `value` to `max_frac` digits and trim trailing zeros down to
/// `min_frac`.
fn round_digits(value: f64, min_frac: usize, max_frac: usize) -> Digits {
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = match repr.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (repr.clone(), String::new()),
    };

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let int_len = digits.len();
    let frac_bytes: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();
    for i in 0..max_frac {
        digits.push(frac_bytes.get(i).copied().unwrap_or(0));
    }

    let round_up = frac_bytes.get(max_frac).is_some_and(|&d| d >= 5);
    let mut int_len = int_len;
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                int_len += 1;
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let to_str = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int = to_str(&digits[..int_len]);
    let mut frac = to_str(&digits[int_len..]);
    while frac.len() > min_frac && frac.ends_with('0') {
        frac.pop();
    }

    let is_zero = digits.iter().all(|&d| d == 0);
    Digits {
        negative: value.is_sign_negative() && !is_zero,
        int,
        frac,
    }
}

fn group(int: &str, locale: Locale) -> String {
    if int.len() < locale.min_grouping_digits() {
        return int.to_string();
    }
    let sep = locale.group_separator();
    let mut out = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

fn unsigned(digits: &Digits, locale: Locale) -> String {
    let mut out = group(&digits.int, locale);
    if !digits.frac.is_empty() {
        out.push(locale.decimal_separator());
        out.push_str(&digits.frac);
    }
    out
}

/// A grouped decimal with between `min_frac` and `max_frac` fraction digits.
pub fn decimal(value: f64, locale: Locale, min_frac: usize, max_frac: usize) -> String {
    let digits = round_digits(value, min_frac, max_frac.max(min_frac));
    let body = unsigned(&digits, locale);
    if digits.negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// A grouped decimal with exactly `frac` fraction digits.
pub fn fixed(value: f64, locale: Locale, frac: usize) -> String {
    decimal(value, locale, frac, frac)
}

/// Currency in the locale's notation: at least `decimals` fraction digits,
/// at most `max(decimals, 2)`.
pub fn currency(value: f64, locale: Locale, decimals: usize) -> String {
    let digits = round_digits(value, decimals, decimals.max(2));
    let body = unsigned(&digits, locale);
    let sign = if digits.negative { "-" } else { "" };
    match locale {
        Locale::EsMx | Locale::EnUs => format!("{}${}", sign, body),
        Locale::EsEs => format!("{}{}\u{a0}€", sign, body),
    }
}

/// Render a number the way a JavaScript host prints it: no trailing `.0`,
/// exponent notation outside `[1e-6, 1e21)`.
pub fn js_number_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        return format!("{}", value);
    }
    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
