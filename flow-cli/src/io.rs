//! Item list input and ordered output

use clap::ValueEnum;
use flow_common::{Error, Result};
use flow_sq::{Item, Sequencer};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

/// Accepted input shapes: a bare array or `{"items": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsDocument {
    List(Vec<Item>),
    Wrapped { items: Vec<Item> },
}

/// Parse an item list, rejecting duplicate ids
pub fn parse_items(text: &str) -> Result<Vec<Item>> {
    let document: ItemsDocument = serde_json::from_str(text)?;
    let items = match document {
        ItemsDocument::List(items) | ItemsDocument::Wrapped { items } => items,
    };

    let mut seen = HashSet::new();
    for item in &items {
        if !seen.insert(item.id.as_str()) {
            return Err(Error::InvalidInput(format!("duplicate item id '{}'", item.id)));
        }
    }

    Ok(items)
}

/// Read items from `path`, or stdin when `path` is absent or `-`
pub fn read_items(path: Option<&Path>) -> Result<Vec<Item>> {
    let text = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_items(&text)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Ordered item array, pretty-printed
    #[default]
    Json,
    /// Numbered listing with each item's strategy description
    Text,
}

pub fn render(items: &[Item], format: OutputFormat, sequencer: &Sequencer) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)? + "\n"),
        OutputFormat::Text => {
            let mut out = String::new();
            for (position, item) in items.iter().enumerate() {
                let title = if item.title.is_empty() { &item.id } else { &item.title };
                let authors = if item.author_names.is_empty() {
                    item.primary_author_id.clone()
                } else {
                    item.author_names.join(", ")
                };
                out.push_str(&format!(
                    "{:>3}. {} - {} [{}]\n",
                    position + 1,
                    title,
                    authors,
                    sequencer.describe_enriched(item)
                ));
            }
            Ok(out)
        }
    }
}

/// Write to `path`, or stdout when absent or `-`
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::write(path, content)?,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_sq::{MoodBandConfig, StrategyKind};

    #[test]
    fn test_parse_bare_array() {
        let items = parse_items(
            r#"[
                {"id": "t1", "primary_author_id": "a1", "tags": ["jazz"]},
                {"id": "t2", "primary_author_id": "a2", "mood": {"energy": 0.2, "valence": 0.4}}
            ]"#,
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tags, Some(vec!["jazz".to_string()]));
        assert_eq!(items[1].mood_or_default().valence, 0.4);
    }

    #[test]
    fn test_parse_wrapped_document() {
        let items = parse_items(r#"{"items": [{"id": "t1", "primary_author_id": "a1"}]}"#).unwrap();
        assert_eq!(items[0].id, "t1");
        assert!(items[0].tags.is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = parse_items(
            r#"[{"id": "t1", "primary_author_id": "a"}, {"id": "t1", "primary_author_id": "b"}]"#,
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(parse_items("{\"tracks\": []}"), Err(Error::Json(_))));
        assert!(parse_items("not json").is_err());
    }

    #[test]
    fn test_read_items_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"id": "t1", "primary_author_id": "a1"}]"#).unwrap();

        assert_eq!(read_items(Some(&path)).unwrap().len(), 1);
        assert!(matches!(read_items(Some(&dir.path().join("missing.json"))), Err(Error::Io(_))));
    }

    #[test]
    fn test_render_text() {
        let sequencer = Sequencer::new(StrategyKind::TagOverlap, MoodBandConfig::default()).unwrap();
        let mut named = Item::new("t1", "a1").with_title("So What").with_tags(["jazz"]);
        named.author_names = vec!["Miles Davis".to_string()];
        let items = vec![named, Item::new("t2", "a2")];

        let text = render(&items, OutputFormat::Text, &sequencer).unwrap();
        assert_eq!(
            text,
            "  1. So What - Miles Davis [Genres: jazz]\n  2. t2 - a2 [No genres found.]\n"
        );
    }

    #[test]
    fn test_render_json_round_trips() {
        let sequencer = Sequencer::new(StrategyKind::Mood, MoodBandConfig::default()).unwrap();
        let items = vec![Item::new("t1", "a1").with_mood(0.5, 0.5)];

        let json = render(&items, OutputFormat::Json, &sequencer).unwrap();
        assert_eq!(parse_items(&json).unwrap(), items);
    }
}
