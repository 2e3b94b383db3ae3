//! Decoding of urlencoded form bodies into entities.

use chrono::{NaiveDate, TimeZone, Utc};
use percent_encoding::percent_decode_str;

use crate::entity::Thing;
use crate::error::AppError;

/// Decodes an `application/x-www-form-urlencoded` body into pairs.
pub fn parse_pairs(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let unplussed = component.replace('+', " ");
    percent_decode_str(&unplussed)
        .decode_utf8_lossy()
        .into_owned()
}

/// Parses an entity form body.
///
/// # Returns
/// The value of the hidden `key` field (when present) and the decoded
/// entity. Malformed or missing fields are [`AppError::InvalidInput`].
pub fn parse_thing(body: &str) -> Result<(Option<u64>, Thing), AppError> {
    let pairs = parse_pairs(body);

    let key = match field(&pairs, "key") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            AppError::InvalidInput(format!("invalid key '{}'", raw))
        })?),
        None => None,
    };

    let int_value = required(&pairs, "int_value")?
        .parse::<i64>()
        .map_err(|e| AppError::InvalidInput(format!("invalid int_value: {}", e)))?;
    let real_value = required(&pairs, "real_value")?
        .parse::<f64>()
        .map_err(|e| AppError::InvalidInput(format!("invalid real_value: {}", e)))?;
    let text = field(&pairs, "text").unwrap_or("").to_string();
    let flag = match required(&pairs, "flag")? {
        "true" => true,
        "false" => false,
        other => {
            return Err(AppError::InvalidInput(format!("invalid flag '{}'", other)));
        }
    };
    let date = NaiveDate::parse_from_str(required(&pairs, "at")?, "%Y-%m-%d")
        .map_err(|e| AppError::InvalidInput(format!("invalid date: {}", e)))?;
    let at = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        AppError::InvalidInput("invalid date".to_string())
    })?);

    Ok((
        key,
        Thing {
            int_value,
            real_value,
            text,
            flag,
            at,
            related: None,
        },
    ))
}

fn field<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn required<'a>(pairs: &'a [(String, String)], name: &str) -> Result<&'a str, AppError> {
    field(pairs, name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("missing field '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_a_complete_form() {
        let body = "int_value=42&real_value=3.5&text=hello+world&flag=true&at=2024-01-09";
        let (key, thing) = parse_thing(body).unwrap();
        assert_eq!(key, None);
        assert_eq!(thing.int_value, 42);
        assert_eq!(thing.real_value, 3.5);
        assert_eq!(thing.text, "hello world");
        assert!(thing.flag);
        assert_eq!(
            (thing.at.year(), thing.at.month(), thing.at.day()),
            (2024, 1, 9)
        );
    }

    #[test]
    fn hidden_key_is_returned_when_present() {
        let body = "key=7&int_value=1&real_value=0&text=&flag=false&at=2024-01-09";
        let (key, thing) = parse_thing(body).unwrap();
        assert_eq!(key, Some(7));
        assert!(!thing.flag);
        assert_eq!(thing.text, "");
    }

    #[test]
    fn percent_escapes_are_decoded() {
        let body = "int_value=1&real_value=0&text=a%26b%3Dc&flag=false&at=2024-01-09";
        let (_, thing) = parse_thing(body).unwrap();
        assert_eq!(thing.text, "a&b=c");
    }

    #[test]
    fn missing_fields_are_invalid_input() {
        let err = parse_thing("int_value=1").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn malformed_numbers_and_dates_are_invalid_input() {
        let body = "int_value=abc&real_value=0&text=&flag=false&at=2024-01-09";
        assert!(matches!(
            parse_thing(body).unwrap_err(),
            AppError::InvalidInput(_)
        ));

        let body = "int_value=1&real_value=0&text=&flag=false&at=tomorrow";
        assert!(matches!(
            parse_thing(body).unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }
}
