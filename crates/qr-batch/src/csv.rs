//! Minimal CSV ingestion for batch items.
//!
//! Format per line: `name,payload[,type]`. Fields are split on every comma
//! and lose one pair of surrounding double quotes; there is no escaping, so
//! payloads containing commas cannot be expressed. A header line is read as
//! an ordinary row.

use tracing::debug;

use crate::BatchItem;

/// Header line emitted by [`sample_csv`].
pub const SAMPLE_HEADER: &str = "Name,Data,Type";

/// Rows emitted by [`sample_csv`]: `(name, payload, type)`. A `None` type
/// leaves the third column out.
pub const SAMPLE_ROWS: &[(&str, &str, Option<&str>)] = &[
    ("Google", "https://google.com", Some("url")),
    (
        "WiFi Network",
        "WIFI:T:WPA2;S:MyNetwork;P:password123;H:false;;",
        Some("wifi"),
    ),
    ("Phone Number", "+1234567890", None),
    ("Text Message", "SMSTO:+1234567890:See you soon", Some("sms")),
    (
        "Email Contact",
        "mailto:contact@example.com?subject=Hello",
        Some("email"),
    ),
];

/// Parse CSV text into batch items, in line order.
///
/// Blank lines are skipped and lines with fewer than two fields are
/// dropped. An empty name becomes `Item <line>`; a missing or empty type
/// becomes `text`.
pub fn parse_csv(text: &str) -> Vec<BatchItem> {
    text.trim()
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index, line))
        .collect()
}

fn parse_line(index: usize, line: &str) -> Option<BatchItem> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let columns: Vec<&str> = line.split(',').map(|c| strip_quotes(c.trim())).collect();
    if columns.len() < 2 {
        debug!(
            line = index + 1,
            "Skipping CSV line with fewer than two fields"
        );
        return None;
    }

    let name = match columns[0] {
        "" => format!("Item {}", index + 1),
        name => name.to_string(),
    };
    let intent_type = columns
        .get(2)
        .copied()
        .filter(|t| !t.is_empty())
        .unwrap_or("text");

    Some(BatchItem::new(name, columns[1], intent_type))
}

fn strip_quotes(field: &str) -> &str {
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

/// Example CSV demonstrating the accepted format.
pub fn sample_csv() -> String {
    let mut lines = vec![SAMPLE_HEADER.to_string()];
    for (name, payload, intent_type) in SAMPLE_ROWS {
        let payload = if payload.contains(';') || payload.contains('?') {
            format!("\"{payload}\"")
        } else {
            payload.to_string()
        };
        match intent_type {
            Some(t) => lines.push(format!("{name},{payload},{t}")),
            None => lines.push(format!("{name},{payload}")),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(items: &[BatchItem]) -> Vec<(&str, &str, &str)> {
        items
            .iter()
            .map(|i| (i.name.as_str(), i.payload.as_str(), i.intent_type.as_str()))
            .collect()
    }

    #[test]
    fn sample_round_trips() {
        let items = parse_csv(&sample_csv());
        let mut expected = vec![("Name", "Data", "Type")];
        expected.extend(
            SAMPLE_ROWS
                .iter()
                .map(|(n, p, t)| (*n, *p, t.unwrap_or("text"))),
        );
        assert_eq!(triples(&items), expected);
    }

    #[test]
    fn skips_blank_lines_and_short_rows() {
        let text = "\nA,hello\n\n   \nlonely\nB,world,url\n";
        let items = parse_csv(text);
        assert_eq!(
            triples(&items),
            vec![("A", "hello", "text"), ("B", "world", "url")]
        );
    }

    #[test]
    fn empty_name_uses_one_based_line_index() {
        let items = parse_csv("A,one\n\n,three");
        assert_eq!(items[1].name, "Item 3");
        assert_eq!(items[1].payload, "three");
    }

    #[test]
    fn strips_one_layer_of_quotes() {
        let items = parse_csv(r#""Quoted Name",""double"","url""#);
        assert_eq!(items[0].name, "Quoted Name");
        assert_eq!(items[0].payload, "\"double\"");
        assert_eq!(items[0].intent_type, "url");
    }

    #[test]
    fn embedded_commas_split_fields() {
        let items = parse_csv(r#"Card,"a,b",text"#);
        assert_eq!(items[0].payload, "a");
        assert_eq!(items[0].intent_type, "b");
    }

    #[test]
    fn empty_type_defaults_to_text() {
        let items = parse_csv("A,payload,");
        assert_eq!(items[0].intent_type, "text");
    }

    #[test]
    fn handles_crlf_line_endings() {
        let items = parse_csv("A,one\r\nB,two\r\n");
        assert_eq!(
            triples(&items),
            vec![("A", "one", "text"), ("B", "two", "text")]
        );
    }

    #[test]
    fn every_item_gets_an_id() {
        let items = parse_csv("A,one\nB,two");
        assert_ne!(items[0].id, items[1].id);
    }
}
