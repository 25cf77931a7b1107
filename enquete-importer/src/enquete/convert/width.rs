//! Full-width / half-width folding

use once_cell::sync::Lazy;

const FULL_WIDTH_ASCII_START: u32 = 0xFF01;
const FULL_WIDTH_ASCII_END: u32 = 0xFF5E;
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

const HALF_WIDTH_KANA_START: u32 = 0xFF61;
const HALF_WIDTH_KANA_END: u32 = 0xFF9F;
const HALF_WIDTH_VOICED_MARK: char = '\u{FF9E}';
const HALF_WIDTH_SEMI_VOICED_MARK: char = '\u{FF9F}';

/// Full-width counterparts of U+FF61..=U+FF9F, in code point order
static FULL_WIDTH_KANA: Lazy<Vec<char>> = Lazy::new(|| {
    "。「」、・ヲァィゥェォャュョッーアイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン゛゜"
        .chars()
        .collect()
});

/// Fold full-width ASCII (digits, Latin letters, symbols) and the
/// ideographic space to their half-width forms
pub fn to_half_width(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            let code = c as u32;
            if (FULL_WIDTH_ASCII_START..=FULL_WIDTH_ASCII_END).contains(&code) {
                char::from_u32(code - FULL_WIDTH_OFFSET).unwrap_or(c)
            } else if c == IDEOGRAPHIC_SPACE {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Fold half-width katakana to full-width, composing voiced marks.
///
/// Only katakana is touched; ASCII and digits are left alone.
pub fn to_full_width_kana(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        let Some(base) = full_width_kana(c) else {
            out.push(c);
            continue;
        };

        let composed = match chars.peek() {
            Some(&HALF_WIDTH_VOICED_MARK) => voiced(base),
            Some(&HALF_WIDTH_SEMI_VOICED_MARK) => semi_voiced(base),
            _ => None,
        };

        match composed {
            Some(composed) => {
                chars.next();
                out.push(composed);
            }
            None => out.push(base),
        }
    }

    out
}

fn full_width_kana(c: char) -> Option<char> {
    let code = c as u32;
    if !(HALF_WIDTH_KANA_START..=HALF_WIDTH_KANA_END).contains(&code) {
        return None;
    }
    FULL_WIDTH_KANA
        .get((code - HALF_WIDTH_KANA_START) as usize)
        .copied()
}

fn voiced(base: char) -> Option<char> {
    match base {
        'ウ' => Some('ヴ'),
        'カ' | 'キ' | 'ク' | 'ケ' | 'コ' | 'サ' | 'シ' | 'ス' | 'セ' | 'ソ' | 'タ' | 'チ' | 'ツ'
        | 'テ' | 'ト' | 'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(base as u32 + 1),
        _ => None,
    }
}

fn semi_voiced(base: char) -> Option<char> {
    match base {
        'ハ' | 'ヒ' | 'フ' | 'ヘ' | 'ホ' => char::from_u32(base as u32 + 2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_half_width() {
        assert_eq!(to_half_width("１０１"), "101");
        assert_eq!(to_half_width("ＡＢｃ－１"), "ABc-1");
        assert_eq!(to_half_width("１\u{3000}２"), "1 2");
        assert_eq!(to_half_width("部屋１"), "部屋1");
    }

    #[test]
    fn test_kana_table_covers_range() {
        assert_eq!(
            FULL_WIDTH_KANA.len(),
            (HALF_WIDTH_KANA_END - HALF_WIDTH_KANA_START + 1) as usize
        );
    }

    #[test]
    fn test_to_full_width_kana() {
        assert_eq!(to_full_width_kana("ｱｲｳｴｵ"), "アイウエオ");
        assert_eq!(to_full_width_kana("ｶﾞｷﾞｸﾞ"), "ガギグ");
        assert_eq!(to_full_width_kana("ﾊﾟﾋﾟ"), "パピ");
        assert_eq!(to_full_width_kana("ｳﾞｨ"), "ヴィ");
        assert_eq!(to_full_width_kana("ｱﾞ"), "ア゛");
        assert_eq!(to_full_width_kana("ﾃｽﾄ 123 abc"), "テスト 123 abc");
        assert_eq!(to_full_width_kana("ｰ｡"), "ー。");
    }
}
