//! Small HTML fragment builders shared by the screens.

use chrono::{DateTime, Datelike, Utc};

/// Escapes text for safe interpolation into HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A label tied to the form field of the same name.
pub fn label(name: &str) -> String {
    format!("<label for=\"{name}\">{name}: </label>")
}

/// A form input, optionally pre-filled.
pub fn input(kind: &str, id: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "<input type=\"{kind}\" id=\"{id}\" name=\"{id}\" value=\"{}\">",
            escape(value)
        ),
        None => format!("<input type=\"{kind}\" id=\"{id}\" name=\"{id}\">"),
    }
}

/// A hidden input carrying a fixed value.
pub fn hidden_input(id: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" id=\"{id}\" name=\"{id}\" value=\"{}\">",
        escape(value)
    )
}

/// A pair of radio buttons for a boolean field.
pub fn radio_pair(name: &str, checked: Option<bool>) -> String {
    let mut out = String::new();
    for (value, text) in [(true, "True"), (false, "False")] {
        let checked_attr = if checked == Some(value) { " checked" } else { "" };
        out.push_str(&format!(
            "<label for=\"{name}-{value}\">{text}: </label>\
             <input type=\"radio\" id=\"{name}-{value}\" name=\"{name}\" value=\"{value}\"{checked_attr}>"
        ));
    }
    out
}

/// An anchor to an application route.
pub fn link(text: &str, href: &str) -> String {
    format!("<a href=\"{href}\">{}</a>", escape(text))
}

/// A single-button form posting to an action route.
pub fn action_button(text: &str, action: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\" class=\"inline\">\
         <button type=\"submit\">{}</button></form>",
        escape(text)
    )
}

/// Formats a timestamp as `d/m/yyyy`, without zero padding.
pub fn format_date(at: &DateTime<Utc>) -> String {
    format!("{}/{}/{}", at.day(), at.month(), at.year())
}

/// Formats a real number truncated to two decimals.
pub fn format_real(value: f64) -> String {
    let truncated = (value * 100.0).floor() / 100.0;
    format!("{}", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn date_format_is_day_month_year() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(format_date(&at), "5/3/2024");
    }

    #[test]
    fn reals_truncate_to_two_decimals() {
        assert_eq!(format_real(12.349), "12.34");
        assert_eq!(format_real(7.0), "7");
        assert_eq!(format_real(0.5), "0.5");
    }

    #[test]
    fn radio_pair_checks_the_current_value() {
        let html = radio_pair("flag", Some(false));
        assert!(html.contains("value=\"false\" checked"));
        assert!(!html.contains("value=\"true\" checked"));
    }
}
