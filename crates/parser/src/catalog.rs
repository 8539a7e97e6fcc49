use scraper::{Html, Selector};
use tracing::debug;

use coursegrab_core::CourseDescriptor;

/// Look up the identifiers needed to act on a course offering.
///
/// The portal returns the catalog as a bare row fragment, so it is
/// wrapped in a synthetic table root before parsing. The first row whose
/// serialized HTML contains `code` is the match (substring match — the
/// portal's codes are not prefixes of each other, a known limitation of
/// the upstream interface), and within it only the first `<input>` is
/// inspected: `data-rowindex` present means the offering is selectable.
///
/// Every miss — no matching row, a matched row without an input, or an
/// input without the identifier attributes — reads as "unavailable this
/// round" (`None`), never as an error.
pub fn find_course(catalog_fragment: &str, code: &str) -> Option<CourseDescriptor> {
    let wrapped = format!("<table>{catalog_fragment}</table>");
    let document = Html::parse_document(&wrapped);
    let row_sel = Selector::parse("tr").unwrap();
    let input_sel = Selector::parse("input").unwrap();

    for row in document.select(&row_sel) {
        if !row.html().contains(code) {
            continue;
        }

        let input = row.select(&input_sel).next()?;
        let rowindex = input.value().attr("data-rowindex")?;
        let crdid = input.value().attr("data-crdid")?;

        debug!(course = %code, crdid, rowindex, "course row is selectable");
        return Some(CourseDescriptor {
            code: code.to_string(),
            crdid: crdid.to_string(),
            rowindex: rowindex.to_string(),
        });
    }

    None
}
