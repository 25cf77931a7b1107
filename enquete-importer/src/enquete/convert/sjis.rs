//! Shift_JIS sanitization for free-form text

use encoding_rs::SHIFT_JIS;

/// Replacement for characters Shift_JIS cannot represent
pub const REPLACEMENT: char = '?';

/// Code points where JIS X 0208 and the Windows code page (CP932) decode the
/// same bytes differently, as (JIS form, Windows form).
const JIS_VARIANTS: [(char, char); 7] = [
    ('\u{301C}', '\u{FF5E}'),
    ('\u{2016}', '\u{2225}'),
    ('\u{2212}', '\u{FF0D}'),
    ('\u{2014}', '\u{2015}'),
    ('\u{00A2}', '\u{FFE0}'),
    ('\u{00A3}', '\u{FFE1}'),
    ('\u{00AC}', '\u{FFE2}'),
];

/// Replace every character outside strict Shift_JIS (JIS X 0208) with `?`.
///
/// The encoder underneath is the CP932 superset, so its extensions (NEC
/// specials such as ①, IBM kanji such as 髙, and the Windows-only forms in
/// [`JIS_VARIANTS`]) are rejected here. Characters are checked one at a time
/// so a single bad character never takes its neighbours with it.
pub fn sanitize_shift_jis(value: &str) -> String {
    value
        .chars()
        .map(|c| if is_strict_shift_jis(c) { c } else { REPLACEMENT })
        .collect()
}

fn is_strict_shift_jis(c: char) -> bool {
    if JIS_VARIANTS.iter().any(|&(_, windows)| windows == c) {
        return false;
    }
    let c = JIS_VARIANTS
        .iter()
        .find(|&&(jis, _)| jis == c)
        .map_or(c, |&(_, windows)| windows);

    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));
    if had_errors {
        return false;
    }
    match bytes.as_ref() {
        [_] => true,
        // JIS X 0208 rows only; 0x85-0x87 and 0xEB-0xFC are vendor extensions
        [lead, _] => matches!(*lead, 0x81..=0x84 | 0x88..=0x9F | 0xE0..=0xEA),
        _ => false,
    }
}
