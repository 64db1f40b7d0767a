use std::io::Cursor;

use super::prompt::pick_label;
use super::run::draw_secret;
use crate::catalog::LabelCatalog;

fn catalog() -> LabelCatalog {
    let (catalog, _) =
        LabelCatalog::parse("n1,tabby,tabby cat\nn2,dog\nn3,tench\n").expect("catalog");
    catalog
}

#[test]
fn pick_label_selects_by_number_after_search() {
    let catalog = catalog();
    let mut input = Cursor::new("tabby\n1\n");
    let mut output = Vec::new();

    let picked = pick_label(&catalog, &mut input, &mut output)
        .expect("prompt")
        .expect("a label should be picked");
    assert_eq!(picked.id, "n1");

    let transcript = String::from_utf8(output).expect("utf8");
    assert!(transcript.contains("1. tabby (tabby cat)"));
}

#[test]
fn pick_label_retries_after_an_unmatched_query() {
    let catalog = catalog();
    let mut input = Cursor::new("zeppelin\ndog\n1\n");
    let mut output = Vec::new();

    let picked = pick_label(&catalog, &mut input, &mut output)
        .expect("prompt")
        .expect("a label should be picked");
    assert_eq!(picked.id, "n2");

    let transcript = String::from_utf8(output).expect("utf8");
    assert!(transcript.contains("No labels matched 'zeppelin'"));
}

#[test]
fn pick_label_accepts_a_new_search_at_the_pick_prompt() {
    let catalog = catalog();
    let mut input = Cursor::new("tabby\ntench\n1\n");
    let mut output = Vec::new();

    let picked = pick_label(&catalog, &mut input, &mut output)
        .expect("prompt")
        .expect("a label should be picked");
    assert_eq!(picked.id, "n3");
}

#[test]
fn pick_label_rejects_out_of_range_numbers() {
    let catalog = catalog();
    let mut input = Cursor::new("dog\n9\n1\n");
    let mut output = Vec::new();

    let picked = pick_label(&catalog, &mut input, &mut output)
        .expect("prompt")
        .expect("a label should be picked");
    assert_eq!(picked.id, "n2");

    let transcript = String::from_utf8(output).expect("utf8");
    assert!(transcript.contains("Out of range"));
}

#[test]
fn pick_label_returns_none_on_closed_input() {
    let catalog = catalog();
    let mut input = Cursor::new("");
    let mut output = Vec::new();

    let picked = pick_label(&catalog, &mut input, &mut output).expect("prompt");
    assert!(picked.is_none());
}

#[test]
fn draw_secret_stays_inside_the_catalog() {
    let catalog = catalog();
    for _ in 0..16 {
        let secret = draw_secret(&catalog).expect("draw");
        assert!(catalog.get(&secret.id).is_some());
    }
}
