use std::io::{BufRead, Write};

use anyhow::Result;

use crate::catalog::LabelCatalog;
use crate::commands::judge::display_text;
use crate::model::LabelItem;

const SEARCH_LIMIT: usize = 10;

/// Search-and-pick guess input: the player types a query, gets a numbered
/// candidate list, and answers with a number (or a fresh query). Returns
/// None when the input stream closes before a pick.
pub(crate) fn pick_label(
    catalog: &LabelCatalog,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<LabelItem>> {
    let mut candidates: Vec<LabelItem> = Vec::new();

    loop {
        if candidates.is_empty() {
            write!(writer, "Your guess (type to search labels): ")?;
            writer.flush()?;
            let Some(line) = read_line(reader)? else {
                return Ok(None);
            };
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            candidates = search_and_list(catalog, query, writer)?;
            continue;
        }

        write!(writer, "Pick a number (or type a new search): ")?;
        writer.flush()?;
        let Some(line) = read_line(reader)? else {
            return Ok(None);
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Ok(choice) = input.parse::<usize>() {
            if let Some(item) = choice.checked_sub(1).and_then(|index| candidates.get(index)) {
                return Ok(Some(item.clone()));
            }
            writeln!(writer, "Out of range; pick 1..={}.", candidates.len())?;
            continue;
        }

        candidates = search_and_list(catalog, input, writer)?;
    }
}

fn search_and_list(
    catalog: &LabelCatalog,
    query: &str,
    writer: &mut dyn Write,
) -> Result<Vec<LabelItem>> {
    let hits: Vec<LabelItem> = catalog
        .search(query, SEARCH_LIMIT)
        .into_iter()
        .cloned()
        .collect();

    if hits.is_empty() {
        writeln!(writer, "No labels matched '{query}'. Try again.")?;
        return Ok(Vec::new());
    }

    for (rank, item) in hits.iter().enumerate() {
        writeln!(writer, "  {}. {}", rank + 1, display_text(item))?;
    }
    Ok(hits)
}

fn read_line(reader: &mut dyn BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let count = reader.read_line(&mut line)?;
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
