use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::LabelItem;

/// How a free-text prediction landed on a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Primary,
    Alias,
    Partial,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Alias => "alias",
            Self::Partial => "partial",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseCounts {
    pub skipped_lines: usize,
    pub duplicate_ids: usize,
}

/// An ordered, id-unique label catalog. Order is the source order and is
/// the tie-break for every lookup.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    items: Vec<LabelItem>,
}

impl LabelCatalog {
    pub fn new(items: Vec<LabelItem>) -> Self {
        Self { items }
    }

    /// Parses raw catalog text. Two line grammars are accepted, detected
    /// per line:
    ///
    ///   id,name,alias1,alias2        (at least id + name)
    ///   index: 'name, alias'         (ImageNet class-index map)
    ///
    /// Blank lines are skipped; lines that fit neither grammar, or that
    /// repeat an already-seen id, are dropped and counted.
    pub fn parse(text: &str) -> Result<(Self, ParseCounts)> {
        let indexed_line =
            Regex::new(r"^(\d+)\s*:\s*'(.*)'\s*,?$").context("failed to compile catalog line regex")?;

        let mut items = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut counts = ParseCounts::default();

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let parsed = if let Some(captures) = indexed_line.captures(trimmed) {
                parse_indexed_line(&captures)
            } else {
                parse_csv_line(trimmed)
            };

            let Some(item) = parsed else {
                counts.skipped_lines += 1;
                continue;
            };

            if !seen_ids.insert(item.id.clone()) {
                counts.duplicate_ids += 1;
                continue;
            }

            items.push(item);
        }

        Ok((Self { items }, counts))
    }

    pub fn items(&self) -> &[LabelItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LabelItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn alias_count(&self) -> usize {
        self.items.iter().map(|item| item.aliases.len()).sum()
    }

    /// Substring search over primary names and aliases, in catalog order.
    /// An empty or whitespace query returns nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&LabelItem> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Vec::new();
        }

        self.items
            .iter()
            .filter(|item| {
                item.primary_name.contains(&normalized)
                    || item.aliases.iter().any(|alias| alias.contains(&normalized))
            })
            .take(limit)
            .collect()
    }

    /// Maps a free-text prediction to the closest catalog entry: exact
    /// primary name, then exact alias, then primary-name substring. First
    /// match in catalog order wins.
    pub fn match_prediction(&self, predicted: &str) -> Option<(&LabelItem, MatchKind)> {
        let normalized = predicted.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(item) = self.items.iter().find(|item| item.primary_name == normalized) {
            return Some((item, MatchKind::Primary));
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|item| item.aliases.iter().any(|alias| alias == &normalized))
        {
            return Some((item, MatchKind::Alias));
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|item| item.primary_name.contains(&normalized))
        {
            return Some((item, MatchKind::Partial));
        }
        None
    }

    /// Resolves user-supplied text to an entry: exact id first, then the
    /// prediction-match ladder.
    pub fn resolve(&self, text: &str) -> Option<&LabelItem> {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        self.get(&normalized)
            .or_else(|| self.match_prediction(&normalized).map(|(item, _)| item))
    }
}

fn parse_csv_line(line: &str) -> Option<LabelItem> {
    let parts: Vec<String> = line
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .collect();

    if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }

    let aliases = parts[2..]
        .iter()
        .filter(|alias| !alias.is_empty())
        .cloned()
        .collect();

    Some(LabelItem {
        id: parts[0].clone(),
        primary_name: parts[1].clone(),
        aliases,
    })
}

fn parse_indexed_line(captures: &regex::Captures<'_>) -> Option<LabelItem> {
    let id = captures.get(1)?.as_str().to_string();
    let names: Vec<String> = captures
        .get(2)?
        .as_str()
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let (primary_name, aliases) = names.split_first()?;

    Some(LabelItem {
        id,
        primary_name: primary_name.clone(),
        aliases: aliases.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> LabelCatalog {
        let text = "\
n01440764,tench,tinca tinca
n02123045,tabby,tabby cat
n02084071,dog,domestic dog,canis familiaris
";
        let (catalog, _) = LabelCatalog::parse(text).expect("sample catalog should parse");
        catalog
    }

    #[test]
    fn parse_accepts_csv_lines_and_normalizes_case() {
        let (catalog, counts) =
            LabelCatalog::parse("N01440764, Tench, Tinca Tinca\n").expect("parse");

        assert_eq!(catalog.len(), 1);
        assert_eq!(counts.skipped_lines, 0);
        let item = &catalog.items()[0];
        assert_eq!(item.id, "n01440764");
        assert_eq!(item.primary_name, "tench");
        assert_eq!(item.aliases, vec!["tinca tinca"]);
    }

    #[test]
    fn parse_accepts_indexed_lines() {
        let (catalog, _) =
            LabelCatalog::parse("0: 'tench, Tinca tinca',\n1: 'goldfish'\n").expect("parse");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].id, "0");
        assert_eq!(catalog.items()[0].primary_name, "tench");
        assert_eq!(catalog.items()[0].aliases, vec!["tinca tinca"]);
        assert_eq!(catalog.items()[1].primary_name, "goldfish");
        assert!(catalog.items()[1].aliases.is_empty());
    }

    #[test]
    fn parse_skips_blank_and_unparseable_lines() {
        let text = "\n\nonly-one-field\nn1,ok\n,missing-id\n";
        let (catalog, counts) = LabelCatalog::parse(text).expect("parse");

        assert_eq!(catalog.len(), 1);
        assert_eq!(counts.skipped_lines, 2);
    }

    #[test]
    fn parse_drops_duplicate_ids_keeping_the_first() {
        let text = "n1,first\nn1,second\nn2,other\n";
        let (catalog, counts) = LabelCatalog::parse(text).expect("parse");

        assert_eq!(catalog.len(), 2);
        assert_eq!(counts.duplicate_ids, 1);
        assert_eq!(catalog.get("n1").expect("n1").primary_name, "first");
    }

    #[test]
    fn every_parsed_item_has_nonempty_id_and_primary_name() {
        let text = "n1,tench\n2: 'goldfish'\n,\n3: ''\n";
        let (catalog, _) = LabelCatalog::parse(text).expect("parse");

        assert!(!catalog.is_empty());
        for item in catalog.items() {
            assert!(!item.id.is_empty());
            assert!(!item.primary_name.is_empty());
        }
    }

    #[test]
    fn matching_a_primary_name_is_idempotent() {
        let catalog = sample_catalog();

        for item in catalog.items() {
            let (matched, kind) = catalog
                .match_prediction(&item.primary_name)
                .expect("own primary name should match");
            assert_eq!(matched.id, item.id);
            assert_eq!(kind, MatchKind::Primary);
        }
    }

    #[test]
    fn match_prefers_primary_then_alias_then_substring() {
        let catalog = sample_catalog();

        let (item, kind) = catalog.match_prediction("Tabby").expect("primary");
        assert_eq!((item.id.as_str(), kind), ("n02123045", MatchKind::Primary));

        let (item, kind) = catalog.match_prediction("canis familiaris").expect("alias");
        assert_eq!((item.id.as_str(), kind), ("n02084071", MatchKind::Alias));

        let (item, kind) = catalog.match_prediction("tab").expect("partial");
        assert_eq!((item.id.as_str(), kind), ("n02123045", MatchKind::Partial));

        assert!(catalog.match_prediction("zeppelin").is_none());
        assert!(catalog.match_prediction("   ").is_none());
    }

    #[test]
    fn partial_match_tie_breaks_on_catalog_order() {
        let (catalog, _) = LabelCatalog::parse("n1,house cat\nn2,cat\n").expect("parse");

        // "cat" hits n2 exactly on primary name, but a fragment falls back
        // to the first substring holder in catalog order.
        let (item, kind) = catalog.match_prediction("ca").expect("partial");
        assert_eq!(item.id, "n1");
        assert_eq!(kind, MatchKind::Partial);
    }

    #[test]
    fn search_scans_primary_names_and_aliases() {
        let catalog = sample_catalog();

        let hits = catalog.search("tinca", 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "n01440764");

        let hits = catalog.search("ca", 20);
        assert_eq!(hits.len(), 3);

        assert!(catalog.search("", 20).is_empty());
        assert_eq!(catalog.search("ca", 2).len(), 2);
    }

    #[test]
    fn resolve_accepts_ids_and_free_text() {
        let catalog = sample_catalog();

        assert_eq!(catalog.resolve("n02084071").expect("id").primary_name, "dog");
        assert_eq!(catalog.resolve("Tabby Cat").expect("alias").id, "n02123045");
        assert!(catalog.resolve("").is_none());
    }
}
