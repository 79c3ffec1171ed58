use chrono::{NaiveDate, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC date as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

pub fn parse_date(buf: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(buf.trim(), DATE_FORMAT)
        .map_err(|e| format!("Unable to parse date {}: {}", buf, e))
}

/// Formats a stored date the way the newsletter shows it, e.g. `April 3, 2025`.
/// Dates that do not parse are shown as stored.
pub fn format_long_date(buf: &str) -> String {
    match parse_date(buf) {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => buf.to_string(),
    }
}

pub fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Splits post content into paragraphs, one per non-blank line.
pub fn paragraphs(content: &str) -> Vec<&str> {
    content.split('\n')
        .filter(|p| !p.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2025-04-03").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 4, 3).unwrap());

        assert!(parse_date("03/04/2025").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date("2025-04-03"), "April 3, 2025");
        assert_eq!(format_long_date("2024-12-25"), "December 25, 2024");
        assert_eq!(format_long_date("soon"), "soon");
    }

    #[test]
    fn test_today_parses() {
        assert!(parse_date(&today()).is_ok());
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("IPO News", "ipo"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Market Analysis", "crypto"));
    }

    #[test]
    fn test_paragraphs() {
        let content = "First line.\n\n  \nSecond line.\nThird.";
        assert_eq!(paragraphs(content), ["First line.", "Second line.", "Third."]);
        assert!(paragraphs("").is_empty());
    }
}
