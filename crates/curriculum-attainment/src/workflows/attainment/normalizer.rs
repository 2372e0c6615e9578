/// Canonical comparison key for a course code.
///
/// Codes are opaque strings: leading zeros are kept. A single trailing
/// fractional part such as `.0` is dropped, since spreadsheet tools turn
/// numeric code columns into floats.
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return String::new();
    }

    match trimmed.split_once('.') {
        Some((head, fraction))
            if !head.trim().is_empty() && fraction.chars().all(|c| c.is_ascii_digit()) =>
        {
            head.trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Canonical comparison key for a course name.
///
/// Surrounding whitespace is trimmed, parentheses are folded to their
/// half-width form, dash glyphs used as course-sequence separators become
/// `一`, and Roman numerals I to VIII become Arabic digits. Inner spaces are
/// kept, so `Data Base` and `DataBase` stay distinct.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return String::new();
    }

    let mut name = trimmed.replace('（', "(").replace('）', ")");
    for dash in ["——", "--", "—", "–", "―", "－"] {
        name = name.replace(dash, "一");
    }

    replace_roman_numerals(&name)
}

fn is_missing(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

const LATIN_NUMERALS: &[(&str, char)] = &[
    ("I", '1'),
    ("II", '2'),
    ("III", '3'),
    ("IV", '4'),
    ("V", '5'),
    ("VI", '6'),
    ("VII", '7'),
    ("VIII", '8'),
];

fn replace_roman_numerals(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut run = String::new();

    for c in name.chars() {
        if c.is_ascii_alphabetic() {
            run.push(c);
            continue;
        }
        flush_latin_run(&mut run, &mut out);
        out.push(numeral_glyph_digit(c).unwrap_or(c));
    }
    flush_latin_run(&mut run, &mut out);

    out
}

// Only the trailing `I`/`V` part of a letter run is a numeral candidate, and
// it is replaced whole or not at all: `AII` becomes `A2`, `VIII` never
// degrades into `5III`, and `GIS` or `CIVIL` are left alone.
fn flush_latin_run(run: &mut String, out: &mut String) {
    if run.is_empty() {
        return;
    }
    let split = run.trim_end_matches(['I', 'V']).len();
    let (prefix, suffix) = run.split_at(split);
    out.push_str(prefix);
    match LATIN_NUMERALS
        .iter()
        .find(|(numeral, _)| *numeral == suffix)
    {
        Some((_, digit)) => out.push(*digit),
        None => out.push_str(suffix),
    }
    run.clear();
}

fn numeral_glyph_digit(c: char) -> Option<char> {
    // Ⅰ..Ⅷ and ⅰ..ⅷ
    let offset = match c as u32 {
        code @ 0x2160..=0x2167 => code - 0x2160,
        code @ 0x2170..=0x2177 => code - 0x2170,
        _ => return None,
    };
    char::from_digit(offset + 1, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_drops_float_suffix_and_keeps_leading_zeros() {
        assert_eq!(normalize_code(" 00123456.0 "), "00123456");
        assert_eq!(normalize_code("123456"), "123456");
        assert_eq!(normalize_code("A1020.00"), "A1020");
        assert_eq!(normalize_code("1.2.0"), "1.2.0");
    }

    #[test]
    fn missing_values_normalize_to_empty() {
        assert_eq!(normalize_code("  "), "");
        assert_eq!(normalize_code("NaN"), "");
        assert_eq!(normalize_name("nan"), "");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn name_unifies_parentheses_and_dashes() {
        assert_eq!(normalize_name("物理实验（上）"), "物理实验(上)");
        assert_eq!(normalize_name("科学教育——实践"), "科学教育一实践");
        assert_eq!(normalize_name("科学教育--实践"), "科学教育一实践");
        assert_eq!(normalize_name("科学教育—实践"), "科学教育一实践");
    }

    #[test]
    fn name_replaces_latin_and_glyph_numerals() {
        assert_eq!(normalize_name("微积分I"), "微积分1");
        assert_eq!(normalize_name("微积分Ⅰ"), "微积分1");
        assert_eq!(normalize_name("大学英语VIII"), "大学英语8");
        assert_eq!(normalize_name("大学英语Ⅷ"), "大学英语8");
        assert_eq!(normalize_name("大学英语 IV"), "大学英语 4");
        assert_eq!(normalize_name("大学英语Ⅳ"), "大学英语4");
        assert_eq!(normalize_name("GIS原理"), "GIS原理");
    }

    #[test]
    fn name_replaces_numerals_attached_to_letters() {
        assert_eq!(normalize_name("大学物理AI"), "大学物理A1");
        assert_eq!(normalize_name("大学物理AII"), "大学物理A2");
        assert_eq!(normalize_name("高等数学BIV"), "高等数学B4");
        assert_eq!(normalize_name("CIVIL工程"), "CIVIL工程");
        assert_eq!(normalize_name("IIII"), "IIII");
    }

    #[test]
    fn name_trims_ends_but_keeps_inner_spaces() {
        assert_eq!(normalize_name("  数据库原理  "), "数据库原理");
        assert_eq!(normalize_name("Data Base"), "Data Base");
        assert_ne!(normalize_name("Data Base"), normalize_name("DataBase"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            " 00123456.0 ",
            "微积分 I",
            "物理实验（上）——Ⅱ",
            "Visual Basic V",
            "I I",
            "大学物理AII",
            "HIV BIV",
            "科学--教育VII",
            "1.2.0",
            "NaN",
            "",
        ];
        for sample in samples {
            let code = normalize_code(sample);
            assert_eq!(normalize_code(&code), code, "code: {sample:?}");
            let name = normalize_name(sample);
            assert_eq!(normalize_name(&name), name, "name: {sample:?}");
        }
    }
}
