//! End-to-end annotation tests over HTML input

use paddock::annotate::{annotate_html, PageScanner, PageTree};
use paddock::models::DirectoryEntry;
use paddock::service::builtin_roster;

fn grid() -> Vec<DirectoryEntry> {
    vec![
        DirectoryEntry::new("Max Verstappen", "max_verstappen", Some("VER")),
        DirectoryEntry::new("Verstappen", "verstappen", None),
        DirectoryEntry::new("Charles Leclerc", "leclerc", Some("LEC")),
        DirectoryEntry::new("Nico Hülkenberg", "hulkenberg", Some("HUL")),
    ]
}

#[test]
fn test_fragment_annotation() {
    let result = annotate_html(
        &grid(),
        "<p>Max Verstappen held off Charles Leclerc.</p>",
        false,
    );

    assert_eq!(result.wrapped, 2);
    assert_eq!(
        result.html,
        concat!(
            r#"<p><span class="f1-driver" data-driver="max_verstappen" tabindex="0" role="button" aria-label="Max Verstappen stats">Max Verstappen</span>"#,
            " held off ",
            r#"<span class="f1-driver" data-driver="leclerc" tabindex="0" role="button" aria-label="Charles Leclerc stats">Charles Leclerc</span>"#,
            ".</p>"
        )
    );
}

#[test]
fn test_span_keeps_page_casing() {
    let result = annotate_html(&grid(), "<li>NICO HÜLKENBERG scores</li>", false);

    assert_eq!(result.wrapped, 1);
    assert!(result.html.contains(r#"aria-label="Nico Hülkenberg stats">NICO HÜLKENBERG</span>"#));
}

#[test]
fn test_longest_name_at_same_offset() {
    let result = annotate_html(&grid(), "<p>Max Verstappen, then Verstappen again</p>", false);

    assert_eq!(result.wrapped, 2);
    assert!(result.html.contains(r#"data-driver="max_verstappen""#));
    assert!(result.html.contains(r#"data-driver="verstappen""#));
}

#[test]
fn test_full_document_scans_body_only() {
    let input = concat!(
        "<!DOCTYPE html><html><head><title>Charles Leclerc wins</title></head>",
        "<body><h1>Charles Leclerc wins</h1><script>var d = 'Charles Leclerc';</script></body></html>"
    );
    let result = annotate_html(&grid(), input, true);

    assert_eq!(result.wrapped, 1);
    assert!(result.html.starts_with("<!DOCTYPE html><html><head><title>Charles Leclerc wins</title>"));
    assert!(result.html.contains("<script>var d = 'Charles Leclerc';</script>"));
    assert!(result.html.contains(r#"<h1><span class="f1-driver" data-driver="leclerc""#));
}

#[test]
fn test_nested_markup_and_entities() {
    let input = "<div><p>Q3: <em>Max Verstappen</em> &amp; Charles Leclerc &lt;3</p><textarea>Max Verstappen</textarea></div>";
    let result = annotate_html(&grid(), input, false);

    assert_eq!(result.wrapped, 2);
    assert!(result.html.contains("<em><span class=\"f1-driver\""));
    assert!(result.html.contains("&amp; <span"));
    assert!(result.html.contains("</span> &lt;3</p>"));
    assert!(result.html.contains("<textarea>Max Verstappen</textarea>"));
}

#[test]
fn test_annotated_output_is_stable() {
    let once = annotate_html(&grid(), "<p>Verstappen and Leclerc? Charles Leclerc!</p>", false);
    let twice = annotate_html(&grid(), &once.html, false);

    assert_eq!(once.wrapped, 2);
    assert_eq!(twice.wrapped, 0);
    assert_eq!(twice.html, once.html);
}

#[test]
fn test_builtin_roster_drives_scanner() {
    let roster = builtin_roster();
    let mut tree = PageTree::parse_fragment("<p>Oscar Piastri passed Sergio Pérez</p>");
    let root = tree.root();

    let wrapped = PageScanner::new(&roster).scan(&mut tree, root);

    assert_eq!(wrapped, 2);
    assert!(tree.to_html().contains(r#"data-driver="perez""#));
}

#[test]
fn test_empty_directory_leaves_html_untouched() {
    let input = "<p>Max Verstappen</p>";
    let result = annotate_html(&[], input, false);

    assert_eq!(result.wrapped, 0);
    assert_eq!(result.html, input);
}

#[test]
fn test_svg_namespaced_attributes_preserved() {
    let directory = vec![DirectoryEntry::new("Lewis Hamilton", "hamilton", Some("HAM"))];
    let input = r##"<p>Lewis Hamilton</p><svg><use xlink:href="#icon"></use></svg>"##;
    let result = annotate_html(&directory, input, false);

    assert_eq!(result.wrapped, 1);
    assert!(result.html.ends_with(r##"<svg><use xlink:href="#icon"></use></svg>"##));
    assert!(result.html.contains(r#"data-driver="hamilton""#));
}
