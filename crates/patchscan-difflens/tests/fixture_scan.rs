use patchscan_core::{Keyword, Polarity};
use patchscan_difflens::filter::SourceFilter;
use patchscan_difflens::frequency::count_keywords;
use patchscan_difflens::parser::{changed_lines, extract_diff_blocks};

const PATCH: &str = include_str!("fixtures/mixed.patch");

#[test]
fn format_patch_tracks_only_python_block() {
    let blocks = extract_diff_blocks(PATCH, &SourceFilter::default_filter());
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].path, "uploader/core.py");
    assert_eq!(blocks[0].lines.len(), 21);
    assert_eq!(blocks[0].lines[0].polarity, Polarity::Removed);
    assert_eq!(blocks[0].lines[0].body, "import urllib");
    assert!(blocks[0]
        .lines
        .iter()
        .all(|l| !l.body.contains("version = 0.2")));
}

#[test]
fn wider_filter_picks_up_config_block() {
    let filter = SourceFilter::new(&["py", "cfg"]).unwrap();
    let blocks = extract_diff_blocks(PATCH, &filter);
    let paths: Vec<&str> = blocks.iter().map(|b| b.path.as_str()).collect();
    assert_eq!(paths, vec!["setup.cfg", "uploader/core.py"]);
}

#[test]
fn frequency_covers_every_file_in_patch() {
    let tally = count_keywords(&changed_lines(PATCH));

    assert_eq!(tally.added(Keyword::For), 2);
    assert_eq!(tally.removed(Keyword::For), 2);
    assert_eq!(tally.added(Keyword::If), 2);
    assert_eq!(tally.removed(Keyword::If), 1);
    assert_eq!(tally.added(Keyword::Raise), 3);
    assert_eq!(tally.added(Keyword::Except), 1);
    assert_eq!(tally.added(Keyword::Try), 1);
    assert_eq!(tally.added(Keyword::Else), 1);
    assert_eq!(tally.added(Keyword::Break), 1);
    assert_eq!(tally.added(Keyword::Import), 1);
    assert_eq!(tally.removed(Keyword::Import), 1);
    assert_eq!(tally.removed(Keyword::Del), 1);
    assert_eq!(tally.added(Keyword::Class), 0);
}
