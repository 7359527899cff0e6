use anyhow::{anyhow, Result};
use journal_affiliations::parse::{
    parse_affiliations, AffiliationMap, AuthorProcessor, Identity, SplitOn,
};
use journal_affiliations::{CollectingSink, Diagnostic};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_simple_block_assigns_affiliation_to_each_author() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["Dept of Biology, State University (J. Smith, K. Lee)"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(map.len(), 2);
    assert_eq!(
        map.get("J. Smith").unwrap(),
        strings(&["Dept of Biology, State University"])
    );
    assert_eq!(
        map.get("K. Lee").unwrap(),
        strings(&["Dept of Biology, State University"])
    );
    assert!(sink.is_empty());
}

#[test]
fn test_simple_block_strips_leading_article() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(&["and the Mayo Clinic, Rochester (A.B.)"], &Identity, None, &sink);

    assert_eq!(map.get("A.B.").unwrap(), strings(&["Mayo Clinic, Rochester"]));
}

#[test]
fn test_complex_block_defers_departments_until_institution() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["Department of Medicine (J. Smith), Department of Surgery (K. Lee), State University"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(
        map.get("J. Smith").unwrap(),
        strings(&["Department of Medicine, State University"])
    );
    assert_eq!(
        map.get("K. Lee").unwrap(),
        strings(&["Department of Surgery, State University"])
    );
    assert!(sink.is_empty());
}

#[test]
fn test_complex_block_normalizes_department_text() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["the Departments of Medicine (A.B.), Surgery (C.D.), Boston University"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(
        map.get("A.B.").unwrap(),
        strings(&["Department of Medicine, Boston University"])
    );
    assert_eq!(map.get("C.D.").unwrap(), strings(&["Surgery, Boston University"]));
}

#[test]
fn test_complex_block_replaces_em_dash_separator() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["Department of Medicine \u{2014} Division of Cardiology (A.B.), Department of Surgery (C.D.), Brigham Hospital"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(
        map.get("A.B.").unwrap(),
        strings(&["Department of Medicine, Division of Cardiology, Brigham Hospital"])
    );
}

#[test]
fn test_institution_splitter_closes_previous_departments() {
    let sink = CollectingSink::new();
    let splitter = SplitOn::new(", the ");
    let map = parse_affiliations(
        &["the Department of Medicine (A.B., C.D.), Massachusetts General Hospital, the Department of Surgery (E.F.), Brigham and Women's Hospital"],
        &Identity,
        Some(&splitter),
        &sink,
    );

    let expected = strings(&["Department of Medicine, Massachusetts General Hospital"]);
    assert_eq!(map.get("A.B.").unwrap(), expected);
    assert_eq!(map.get("C.D.").unwrap(), expected);
    assert_eq!(
        map.get("E.F.").unwrap(),
        strings(&["Department of Surgery, Brigham and Women's Hospital"])
    );
    assert!(sink.is_empty());
}

#[test]
fn test_location_suffix_and_unresolved_departments() {
    let sink = CollectingSink::new();
    let splitter = SplitOn::new(", the ");
    let map = parse_affiliations(
        &["Department of Medicine (A.B.), Harvard Medical School, the Department of Surgery (C.D.), all in Boston"],
        &Identity,
        Some(&splitter),
        &sink,
    );

    assert_eq!(
        map.get("A.B.").unwrap(),
        strings(&["Department of Medicine, Harvard Medical School, Boston"])
    );
    // C.D. never sees an institution; the key exists but stays empty
    assert_eq!(map.get("C.D.").unwrap(), Vec::<String>::new());

    let diagnostics = sink.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    match &diagnostics[0] {
        Diagnostic::UnresolvedDeferred { pending, .. } => {
            assert_eq!(
                pending,
                &vec![("C.D.".to_string(), "Department of Surgery".to_string())]
            );
        }
        other => panic!("unexpected diagnostic: {:?}", other),
    }
}

#[test]
fn test_deferred_pairs_do_not_leak_into_next_block() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &[
            "Department of Medicine (A.B.), Department of Surgery (C.D.)",
            "Department of Pathology (E.F.), Department of Genetics (G.H.), Yale University",
        ],
        &Identity,
        None,
        &sink,
    );

    // closing parenthesis of the first block is not part of the key
    assert!(map.contains_key("C.D."));
    assert!(!map.contains_key("C.D.)"));
    assert!(map.get("A.B.").unwrap().is_empty());
    assert!(map.get("C.D.").unwrap().is_empty());
    assert_eq!(
        map.get("E.F.").unwrap(),
        strings(&["Department of Pathology, Yale University"])
    );
}

#[test]
fn test_malformed_blocks_are_reported_and_skipped() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["No parenthesis here", "", "Dept of Biology (A.B.)", "Dept (unclosed"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(map.len(), 1);
    assert_eq!(map.get("A.B.").unwrap(), strings(&["Dept of Biology"]));
    assert_eq!(
        sink.diagnostics(),
        vec![
            Diagnostic::MalformedBlock {
                block: "No parenthesis here".to_string()
            },
            Diagnostic::MalformedBlock {
                block: String::new()
            },
            Diagnostic::MalformedBlock {
                block: "Dept (unclosed".to_string()
            },
        ]
    );
}

#[test]
fn test_complex_fragment_with_stray_parenthesis_is_reported() {
    let sink = CollectingSink::new();
    let block = "Departments of Medicine (A.B.) and Surgery (C.D.), Yale University";
    let map = parse_affiliations(&[block], &Identity, None, &sink);

    assert_eq!(map.len(), 1);
    assert_eq!(
        map.get("C.D.").unwrap(),
        strings(&["Department of Medicine, Yale University"])
    );
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::MalformedBlock {
            block: block.to_string()
        }]
    );
}

struct RejectLee;

impl AuthorProcessor for RejectLee {
    fn process(&self, fragment: &str) -> Result<Vec<String>> {
        if fragment.contains("Lee") {
            Err(anyhow!("cannot handle {}", fragment))
        } else {
            Ok(vec![fragment.to_string()])
        }
    }
}

#[test]
fn test_failing_processor_contributes_no_authors() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(&["Dept X (J. Smith, K. Lee)"], &RejectLee, None, &sink);

    assert_eq!(map.get("J. Smith").unwrap(), strings(&["Dept X"]));
    assert!(!map.contains_key("K. Lee"));
    assert!(matches!(
        sink.diagnostics().as_slice(),
        [Diagnostic::ProcessorContract { fragment, .. }] if fragment == "K. Lee"
    ));
}

#[test]
fn test_closure_processor() {
    let sink = CollectingSink::new();
    let upper = |fragment: &str| vec![fragment.to_uppercase()];
    let map = parse_affiliations(&["Dept X (smith)"], &upper, None, &sink);

    assert!(map.contains_key("SMITH"));
}

#[test]
fn test_affiliations_accumulate_in_discovery_order() {
    let sink = CollectingSink::new();
    let map = parse_affiliations(
        &["Dept A (J. Smith)", "Dept B (K. Lee, J. Smith)"],
        &Identity,
        None,
        &sink,
    );

    assert_eq!(map.get("J. Smith").unwrap(), strings(&["Dept A", "Dept B"]));
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["J. Smith", "K. Lee"]);
}

#[test]
fn test_parse_is_idempotent() {
    let blocks = [
        "Department of Medicine (J. Smith), Department of Surgery (K. Lee), State University",
        "Dept of Biology, State University (J. Smith)",
    ];
    let first = parse_affiliations(&blocks, &Identity, None, &CollectingSink::new());
    let second = parse_affiliations(&blocks, &Identity, None, &CollectingSink::new());

    assert_eq!(first, second);
}

#[test]
fn test_affiliation_map_get_or_insert_keeps_insertion_order() {
    let mut map = AffiliationMap::new();
    map.get_or_insert("b").push("one".to_string());
    map.get_or_insert("a");
    map.get_or_insert("b").push("two".to_string());

    let entries: Vec<(&str, &[String])> = map.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, "b");
    assert_eq!(entries[0].1, ["one".to_string(), "two".to_string()]);
    assert_eq!(entries[1].0, "a");
    assert!(entries[1].1.is_empty());
}
