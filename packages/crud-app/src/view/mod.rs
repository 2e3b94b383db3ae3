//! HTML screen fragments: list, create, edit and detail views.

pub mod html;

use crate::entity::{Thing, ThingRecord};
use html::{action_button, format_date, format_real, hidden_input, input, label, link, radio_pair};

/// Wraps screen content in the shared page shell with header and nav.
pub fn page(content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Object Manager</title></head>\n\
         <body>\n<header><h1>Object Manager</h1></header>\n\
         <nav>{create} {list} {reset}</nav>\n\
         <main>{content}</main>\n<footer></footer>\n</body>\n</html>\n",
        create = link("Create Object", "/things/new"),
        list = link("List Objects", "/things"),
        reset = action_button("Reset Database", "/reset"),
    )
}

/// One record as `attribute:value` pairs, formatted for display.
pub fn record_summary(thing: &Thing) -> String {
    let related = match &thing.related {
        Some(related) => record_summary(related),
        None => "null".to_string(),
    };
    format!(
        "<span>int_value:{} real_value:{} text:{} flag:{} at:{} related:{} </span>",
        thing.int_value,
        format_real(thing.real_value),
        html::escape(&thing.text),
        thing.flag,
        format_date(&thing.at),
        related,
    )
}

/// The list screen: every record with View/Edit/Delete controls.
pub fn list_screen(records: &[ThingRecord]) -> String {
    let mut rows = String::new();
    for record in records {
        rows.push_str(&record_summary(&record.thing));
        rows.push_str(&link("View", &format!("/things/{}", record.key)));
        rows.push(' ');
        rows.push_str(&link("Edit", &format!("/things/{}/edit", record.key)));
        rows.push(' ');
        rows.push_str(&action_button(
            "Delete",
            &format!("/things/{}/delete", record.key),
        ));
        rows.push_str("<br>\n");
    }
    page(&rows)
}

/// The create screen: an empty form posting to the create action.
pub fn create_screen() -> String {
    let form = format!(
        "<form method=\"post\" action=\"/things\">\n{}\n\
         {} <button type=\"submit\">Accept</button>\n</form>",
        thing_fields(None),
        link("Cancel", "/things"),
    );
    page(&form)
}

/// The edit screen: a pre-filled form with the key in a hidden field.
pub fn edit_screen(record: &ThingRecord) -> String {
    let form = format!(
        "<form method=\"post\" action=\"/things/{key}\">\n{hidden}\n{fields}\n\
         {cancel} <button type=\"submit\">Accept</button>\n</form>",
        key = record.key,
        hidden = hidden_input("key", &record.key.to_string()),
        fields = thing_fields(Some(&record.thing)),
        cancel = link("Cancel", "/things"),
    );
    page(&form)
}

/// The detail screen: one record plus a way back to the list.
pub fn detail_screen(record: &ThingRecord) -> String {
    let content = format!(
        "{}<br>\n{}",
        record_summary(&record.thing),
        link("Back", "/things"),
    );
    page(&content)
}

/// An error page for the given status and message.
pub fn error_page(status: u16, message: &str) -> String {
    page(&format!(
        "<p>Error {}: {}</p>",
        status,
        html::escape(message)
    ))
}

/// Form fields for every entity attribute, pre-filled when editing.
fn thing_fields(thing: Option<&Thing>) -> String {
    let int_value = thing.map(|t| t.int_value.to_string());
    let real_value = thing.map(|t| t.real_value.to_string());
    let text = thing.map(|t| t.text.clone());
    let at = thing.map(|t| t.at.format("%Y-%m-%d").to_string());
    let flag = thing.map(|t| t.flag);

    format!(
        "{}{}<br>\n{}{}<br>\n{}{}<br>\n{}{}<br>\n{}{}<br>",
        label("int_value"),
        input("number", "int_value", int_value.as_deref()),
        label("real_value"),
        input("number", "real_value", real_value.as_deref()),
        label("text"),
        input("text", "text", text.as_deref()),
        label("flag"),
        radio_pair("flag", flag),
        label("at"),
        input("date", "at", at.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_record() -> ThingRecord {
        ThingRecord {
            key: 7,
            thing: Thing {
                int_value: 42,
                real_value: 12.345,
                text: "abc".to_string(),
                flag: true,
                at: Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(),
                related: None,
            },
        }
    }

    #[test]
    fn summary_formats_date_and_real_like_the_display_rules() {
        let summary = record_summary(&sample_record().thing);
        assert!(summary.contains("real_value:12.34 "));
        assert!(summary.contains("at:9/1/2024 "));
        assert!(summary.contains("related:null "));
    }

    #[test]
    fn list_screen_links_each_record() {
        let html = list_screen(&[sample_record()]);
        assert!(html.contains("href=\"/things/7\""));
        assert!(html.contains("href=\"/things/7/edit\""));
        assert!(html.contains("action=\"/things/7/delete\""));
    }

    #[test]
    fn edit_screen_carries_hidden_key_and_prefills() {
        let html = edit_screen(&sample_record());
        assert!(html.contains("name=\"key\" value=\"7\""));
        assert!(html.contains("name=\"text\" value=\"abc\""));
        assert!(html.contains("value=\"2024-01-09\""));
        assert!(html.contains("value=\"true\" checked"));
    }

    #[test]
    fn create_screen_posts_to_the_collection() {
        let html = create_screen();
        assert!(html.contains("action=\"/things\""));
        assert!(!html.contains("name=\"key\""));
    }
}
