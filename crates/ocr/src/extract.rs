use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_whitespace, r"[\t\x0B\x0C\r]+");

re!(re_model_label, r"(?i)model\s*(no\.?|number|#)?\s*:?\s*([\w\-/.]+)");
re!(re_model_mn, r"(?i)m/?n\.?\s*:?\s*([\w\-/.]+)");
re!(re_model_mdl, r"(?i)mdl\.?\s*:?\s*([\w\-/.]+)");

re!(re_serial_label, r"(?i)serial\s*(no\.?|number|#)?\s*:?\s*([\w\-/]+)");
re!(re_serial_sn, r"(?i)s/?n\.?\s*:?\s*([\w\-/]+)");

re!(re_capacity_gal, r"(?i)(\d{2,3})\s*(gal|gallon|gallons)\b");
re!(re_capacity_liter, r"(?i)(\d{2,3})\s*(l|litre|litres|liter|liters)\b");

re!(re_date_label,
    r"(?i)(manufactured|mfg\.?\s*date|date\s*of\s*manufacture|dom)\s*[:\-]?\s*([\w\-/,. ]{6,})");
re!(re_date_numeric, r"\b(\d{1,2})[\-/](\d{1,2})[\-/](\d{2,4})\b");
re!(re_date_ymd, r"\b(\d{4})[\-/](\d{1,2})[\-/](\d{1,2})\b");
re!(re_date_month_name,
    r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2}),?\s+(\d{4})\b");
re!(re_date_abbr_month,
    r"(?i)\b(\d{1,2})\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\.?\s+(\d{4})\b");

/// Brand names matched case-insensitively against the OCR text. Order
/// matters: the first match wins.
const MANUFACTURER_KEYWORDS: &[&str] = &[
    "rheem",
    "ruud",
    "ao smith",
    "a. o. smith",
    "bradford white",
    "state water heaters",
    "state industries",
    "ge",
    "general electric",
    "whirlpool",
    "kenmore",
    "american water heater",
    "navien",
    "noritz",
    "rinnai",
    "bosch",
];

/// Values are cleaned strings, empty when no heuristic matched. Absence of
/// a match is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameplateFields {
    pub manufacturer: String,
    pub model_number: String,
    pub serial_number: String,
    pub capacity: String,
    pub date_of_manufacture: String,
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Extract structured nameplate fields from raw OCR text.
    pub fn extract(ocr_text: &str) -> NameplateFields {
        let text = normalize_whitespace(ocr_text);

        NameplateFields {
            manufacturer: post_clean(detect_manufacturer(&text).as_deref()),
            model_number: post_clean(
                first_match(&[re_model_label(), re_model_mn(), re_model_mdl()], &text).as_deref(),
            ),
            serial_number: post_clean(
                first_match(&[re_serial_label(), re_serial_sn()], &text).as_deref(),
            ),
            capacity: post_clean(parse_capacity(&text).as_deref()),
            date_of_manufacture: post_clean(parse_date_of_manufacture(&text).as_deref()),
        }
    }
}

/// Collapse tabs, carriage returns and vertical whitespace into spaces so
/// label/value pairs split across OCR lines still match.
fn normalize_whitespace(text: &str) -> String {
    re_whitespace().replace_all(text, " ").into_owned()
}

/// The value of interest is the last capture group that participated in
/// the match (hint patterns put optional label groups first).
fn last_group<'t>(caps: &regex::Captures<'t>) -> Option<&'t str> {
    caps.iter().skip(1).flatten().last().map(|m| m.as_str())
}

/// Try patterns in order; the first that matches yields its last captured
/// group, trimmed.
fn first_match(patterns: &[&Regex], text: &str) -> Option<String> {
    for pat in patterns {
        if let Some(caps) = pat.captures(text) {
            if let Some(value) = last_group(&caps) {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

fn detect_manufacturer(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    MANUFACTURER_KEYWORDS
        .iter()
        .find(|brand| lowered.contains(*brand))
        .map(|brand| title_case(brand))
}

/// Title-case each whitespace-separated token ("bradford white" → "Bradford White").
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_capacity(text: &str) -> Option<String> {
    if let Some(caps) = re_capacity_gal().captures(text) {
        return Some(format!("{} gal", &caps[1]));
    }
    if let Some(caps) = re_capacity_liter().captures(text) {
        return Some(format!("{} L", &caps[1]));
    }
    None
}

// ── Date of manufacture ───────────────────────────────────────────────────────

/// Labeled date first, then any generic numeric date substrings; the first
/// candidate that parses wins, rendered as ISO 8601.
fn parse_date_of_manufacture(text: &str) -> Option<String> {
    let mut candidates: Vec<String> = Vec::new();
    if let Some(caps) = re_date_label().captures(text) {
        if let Some(tail) = last_group(&caps) {
            candidates.push(tail.trim().to_string());
        }
    }
    candidates.extend(
        re_date_numeric()
            .find_iter(text)
            .map(|m| m.as_str().to_string()),
    );
    candidates.extend(re_date_ymd().find_iter(text).map(|m| m.as_str().to_string()));

    candidates
        .iter()
        .find_map(|cand| parse_date_candidate(cand))
        .map(|d| d.to_string())
}

/// Ordered date readers, most to least specific.
fn parse_date_candidate(s: &str) -> Option<NaiveDate> {
    try_date_ymd(s)
        .or_else(|| try_date_numeric(s))
        .or_else(|| try_date_month_name(s))
        .or_else(|| try_date_abbr_month(s))
}

fn try_date_ymd(text: &str) -> Option<NaiveDate> {
    let c = re_date_ymd().captures(text)?;
    let y: i32 = c.get(1)?.as_str().parse().ok()?;
    let m: u32 = c.get(2)?.as_str().parse().ok()?;
    let d: u32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn try_date_numeric(text: &str) -> Option<NaiveDate> {
    let c = re_date_numeric().captures(text)?;
    let p1: u32 = c.get(1)?.as_str().parse().ok()?;
    let p2: u32 = c.get(2)?.as_str().parse().ok()?;
    let year = expand_year(c.get(3)?.as_str().parse().ok()?);
    // Assume M/D/Y; fall back to D/M/Y when the month is out of range.
    NaiveDate::from_ymd_opt(year, p1, p2).or_else(|| NaiveDate::from_ymd_opt(year, p2, p1))
}

fn try_date_month_name(text: &str) -> Option<NaiveDate> {
    let c = re_date_month_name().captures(text)?;
    let month = month_name_to_num(c.get(1)?.as_str())?;
    let day: u32 = c.get(2)?.as_str().parse().ok()?;
    let year: i32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn try_date_abbr_month(text: &str) -> Option<NaiveDate> {
    let c = re_date_abbr_month().captures(text)?;
    let day: u32 = c.get(1)?.as_str().parse().ok()?;
    let month = abbr_month_to_num(c.get(2)?.as_str())?;
    let year: i32 = c.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_year(y: i32) -> i32 {
    if y < 100 {
        2000 + y
    } else {
        y
    }
}

fn month_name_to_num(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}

fn abbr_month_to_num(abbr: &str) -> Option<u32> {
    match abbr.to_lowercase().as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

/// Trim surrounding whitespace and stray punctuation, and cap length to
/// guard against pathological matches.
fn post_clean(value: Option<&str>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    let cleaned = v
        .trim()
        .trim_matches(|c: char| matches!(c, '-' | ':' | ';' | ',' | '.' | '#' | ' '));
    if cleaned.chars().count() > 120 {
        cleaned.chars().take(120).collect()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturer_is_title_cased_regardless_of_input_case() {
        for text in ["RHEEM 50 GAL", "rheem tank", "Installed: RhEeM unit"] {
            assert_eq!(Extractor::extract(text).manufacturer, "Rheem");
        }
        assert_eq!(
            Extractor::extract("BRADFORD WHITE CORP").manufacturer,
            "Bradford White"
        );
        assert_eq!(
            Extractor::extract("A. O. SMITH WATER PRODUCTS").manufacturer,
            "A. O. Smith"
        );
    }

    #[test]
    fn manufacturer_absent_yields_empty_string() {
        assert_eq!(Extractor::extract("no brand here").manufacturer, "");
    }

    #[test]
    fn model_number_from_labeled_pattern() {
        assert_eq!(
            Extractor::extract("Model No: ABC-123").model_number,
            "ABC-123"
        );
        assert_eq!(
            Extractor::extract("MODEL NUMBER XE50T06EC55U0").model_number,
            "XE50T06EC55U0"
        );
        assert_eq!(Extractor::extract("M/N: PROG50-38N").model_number, "PROG50-38N");
        assert_eq!(Extractor::extract("MDL RG240T6N").model_number, "RG240T6N");
    }

    #[test]
    fn serial_number_patterns() {
        assert_eq!(
            Extractor::extract("Serial No: Q051923456").serial_number,
            "Q051923456"
        );
        assert_eq!(
            Extractor::extract("S/N 1923A004567").serial_number,
            "1923A004567"
        );
    }

    #[test]
    fn capacity_gallons_and_liters() {
        assert_eq!(Extractor::extract("50 Gallons").capacity, "50 gal");
        assert_eq!(Extractor::extract("CAP 40 GAL").capacity, "40 gal");
        assert_eq!(Extractor::extract("189 L").capacity, "189 L");
        assert_eq!(Extractor::extract("151 litres nominal").capacity, "151 L");
    }

    #[test]
    fn labeled_date_is_parsed_to_iso() {
        assert_eq!(
            Extractor::extract("DOM: 03/14/2019").date_of_manufacture,
            "2019-03-14"
        );
        assert_eq!(
            Extractor::extract("Manufactured: June 5, 2021").date_of_manufacture,
            "2021-06-05"
        );
    }

    #[test]
    fn generic_numeric_dates_are_fallbacks() {
        assert_eq!(
            Extractor::extract("tested 12/25/2020 ok").date_of_manufacture,
            "2020-12-25"
        );
        // Day-first input: month position is out of range, so D/M/Y applies.
        assert_eq!(
            Extractor::extract("25/12/2020").date_of_manufacture,
            "2020-12-25"
        );
        assert_eq!(
            Extractor::extract("built 2018/07/01").date_of_manufacture,
            "2018-07-01"
        );
    }

    #[test]
    fn two_digit_years_expand_to_2000s() {
        assert_eq!(
            Extractor::extract("mfg date 4/9/19").date_of_manufacture,
            "2019-04-09"
        );
    }

    #[test]
    fn unparseable_dates_yield_empty_string() {
        assert_eq!(Extractor::extract("DOM: unknown-era").date_of_manufacture, "");
        assert_eq!(Extractor::extract("99/99/9999").date_of_manufacture, "");
    }

    #[test]
    fn post_clean_trims_punctuation_and_truncates() {
        assert_eq!(post_clean(Some("  ABC-123;,. ")), "ABC-123");
        assert_eq!(post_clean(None), "");
        let long = "X".repeat(200);
        assert_eq!(post_clean(Some(&long)).chars().count(), 120);
    }

    #[test]
    fn whitespace_normalization_joins_label_and_value() {
        let text = "Model\tNo:\tPV-50\rSerial\tNo: 778899";
        let fields = Extractor::extract(text);
        assert_eq!(fields.model_number, "PV-50");
        assert_eq!(fields.serial_number, "778899");
    }

    #[test]
    fn full_nameplate_text() {
        let text = "RHEEM WATER HEATER\nModel No: XE50T06EC55U0\nSerial No: Q052019334\n\
                    Capacity: 50 Gallons\nDOM: 03/14/2019";
        let fields = Extractor::extract(text);
        assert_eq!(fields.manufacturer, "Rheem");
        assert_eq!(fields.model_number, "XE50T06EC55U0");
        assert_eq!(fields.serial_number, "Q052019334");
        assert_eq!(fields.capacity, "50 gal");
        assert_eq!(fields.date_of_manufacture, "2019-03-14");
    }
}
