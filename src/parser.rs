// 🔍 Listing extractor - pulls project records out of the listing page
//
// Deliberately naive string scanning tailored to the source's markup; no
// HTML parser dependency for one known page shape. Each listing lives in a
// `property-item` block; the stable id is the second-to-last path segment
// of the detail-page URL. A block the id cannot be derived from is dropped
// with a warning and never aborts the rest of the page.
//
// All text normalization (entity decoding, tag stripping, whitespace
// collapsing) happens HERE - stored values downstream are compared with
// exact string equality.

use chrono::{DateTime, Utc};
use log::warn;

use crate::listing::Listing;

const PROPERTY_ITEM_CLASS: &str = "property-item";
const TITLE_CLASS: &str = "property-title";
const TITLE_LINK_CLASS: &str = "property-title-link";
const PRICE_CLASS: &str = "property-price";
const ADDRESS_CLASS: &str = "property-address";
const STATUS_CLASS: &str = "ere__term-status";
const DESCRIPTION_CLASS: &str = "property-element-inline";

/// Extract every listing on the page, in page order.
///
/// Per-item failures (no detail link, no derivable slug) drop that item
/// only. Fields missing from a block normalize to the empty string.
pub fn extract_listings(html: &str, observed_at: DateTime<Utc>) -> Vec<Listing> {
    let mut listings = Vec::new();

    for block in split_blocks(html, PROPERTY_ITEM_CLASS) {
        match extract_one(block, observed_at) {
            Some(listing) => listings.push(listing),
            None => warn!("dropping listing block without a derivable id"),
        }
    }

    listings
}

fn extract_one(block: &str, observed_at: DateTime<Utc>) -> Option<Listing> {
    let href = class_attr(block, TITLE_LINK_CLASS, "href")?;
    let list_id = id_from_href(&href)?;

    let mut listing = Listing::new(&list_id, observed_at);
    listing.title = class_text(block, TITLE_CLASS).unwrap_or_default();
    listing.budget = class_text(block, PRICE_CLASS).unwrap_or_default();
    listing.location = class_text(block, ADDRESS_CLASS).unwrap_or_default();
    listing.status = class_text(block, STATUS_CLASS).unwrap_or_default();
    listing.description = class_text(block, DESCRIPTION_CLASS).unwrap_or_default();

    Some(listing)
}

/// The listing id is the second-to-last path segment of the detail URL:
/// `https://example.co.ke/projects/riverside-towers/` → `riverside-towers`.
fn id_from_href(href: &str) -> Option<String> {
    let parts: Vec<&str> = href.split('/').collect();
    if parts.len() < 2 {
        return None;
    }

    let slug = parts[parts.len() - 2].trim();
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/* ---------------- low-level markup helpers ---------------- */

/// Split the page into per-listing chunks: each chunk runs from one
/// occurrence of `class_name` to the next (or end of input). Coarser than
/// real DOM boundaries, but field lookups below only search forward inside
/// a chunk, so trailing markup from a neighbour is harmless.
fn split_blocks<'a>(html: &'a str, class_name: &str) -> Vec<&'a str> {
    let mut starts = Vec::new();
    let mut from = 0;

    while let Some(pos) = html[from..].find(class_name) {
        starts.push(from + pos);
        from = from + pos + class_name.len();
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

/// Normalized inner text of the first element carrying `class_name`.
/// Assumes the element contains no nested element of its own tag name.
fn class_text(s: &str, class_name: &str) -> Option<String> {
    let block = tag_block(s, class_name)?;
    let inner = inner_after_open_tag(block);
    Some(normalize_ws(&strip_tags(&normalize_entities(&inner))))
}

/// Attribute value from the opening tag carrying `class_name`.
fn class_attr(s: &str, class_name: &str, attr: &str) -> Option<String> {
    let marker = s.find(class_name)?;
    let tag_start = s[..marker].rfind('<')?;
    let tag_end = s[marker..].find('>')? + marker;
    let tag = &s[tag_start..tag_end];

    let attr_pat = format!("{}=\"", attr);
    let value_start = tag.find(&attr_pat)? + attr_pat.len();
    let value_end = tag[value_start..].find('"')? + value_start;

    Some(tag[value_start..value_end].to_string())
}

/// Slice from the start of the tag containing `class_name` to the end of
/// its closing tag.
fn tag_block<'a>(s: &'a str, class_name: &str) -> Option<&'a str> {
    let marker = s.find(class_name)?;
    let tag_start = s[..marker].rfind('<')?;

    let after_angle = &s[tag_start + 1..];
    let name_end = after_angle.find(|c: char| c.is_whitespace() || c == '>')?;
    let tag_name = &after_angle[..name_end];

    let open_end = s[marker..].find('>')? + marker + 1;
    let close_pat = format!("</{}>", tag_name);
    let close_rel = s[open_end..].find(&close_pat)?;

    Some(&s[tag_start..open_end + close_rel + close_pat.len()])
}

/// Inner content of a complete `<tag ...>INNER</tag>` block.
fn inner_after_open_tag(block: &str) -> String {
    if let Some(open_end) = block.find('>') {
        if let Some(close_start) = block.rfind('<') {
            if close_start > open_end {
                return block[open_end + 1..close_start].to_string();
            }
        }
    }
    String::new()
}

/// Remove all `<...>` tags.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Minimal entity decoding: the source only uses `&nbsp;` and `&amp;`.
fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

/// Collapse whitespace runs into single spaces and trim.
fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <html><body>
    <div class="property-item">
      <h2 class="property-title">
        <a class="property-title-link" href="https://example.co.ke/projects/riverside-towers/">
          Riverside  Towers
        </a>
      </h2>
      <span class="property-price">KSh 12M &amp; up</span>
      <div class="property-element-inline">
        <span class="property-address">Westlands, Nairobi</span>
        Two bedroom units.
      </div>
      <span class="ere__term-status">Ongoing</span>
    </div>
    <div class="property-item">
      <h2 class="property-title">No Link Yet</h2>
      <span class="property-price">KSh 5M</span>
    </div>
    <div class="property-item">
      <h2 class="property-title">
        <a class="property-title-link" href="https://example.co.ke/projects/hillcrest-villas/">Hillcrest Villas</a>
      </h2>
      <span class="property-price">KSh 8M</span>
    </div>
    </body></html>
    "#;

    #[test]
    fn test_extracts_listings_and_drops_linkless_block() {
        let listings = extract_listings(PAGE, chrono::Utc::now());

        // The middle block has no detail link, so no id can be derived
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].list_id, "riverside-towers");
        assert_eq!(listings[1].list_id, "hillcrest-villas");
    }

    #[test]
    fn test_field_extraction_and_normalization() {
        let listings = extract_listings(PAGE, chrono::Utc::now());
        let first = &listings[0];

        // Nested tags stripped, entities decoded, whitespace collapsed
        assert_eq!(first.title, "Riverside Towers");
        assert_eq!(first.budget, "KSh 12M & up");
        assert_eq!(first.location, "Westlands, Nairobi");
        assert_eq!(first.status, "Ongoing");
        assert_eq!(first.description, "Westlands, Nairobi Two bedroom units.");
    }

    #[test]
    fn test_missing_fields_normalize_to_empty() {
        let listings = extract_listings(PAGE, chrono::Utc::now());
        let second = &listings[1];

        assert_eq!(second.title, "Hillcrest Villas");
        assert_eq!(second.status, "");
        assert_eq!(second.location, "");
        assert_eq!(second.description, "");
    }

    #[test]
    fn test_id_from_href_takes_second_to_last_segment() {
        assert_eq!(
            id_from_href("https://example.co.ke/projects/house-x/").as_deref(),
            Some("house-x")
        );
        assert_eq!(id_from_href("/projects/house-y/").as_deref(), Some("house-y"));
        assert_eq!(id_from_href("house-z"), None);
        assert_eq!(id_from_href("//"), None);
    }

    #[test]
    fn test_empty_page_yields_empty_batch() {
        let listings = extract_listings("<html><body></body></html>", chrono::Utc::now());
        assert!(listings.is_empty());
    }
}
