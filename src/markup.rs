//! Responsive markup: `srcset` candidate lists and `sizes` descriptors.
//!
//! Markup is derived from a [`ProcessingResult`] on demand and never stored
//! in it, so changing the base directory and regenerating is always safe.

use crate::types::ProcessingResult;
use maud::{Markup, html};

/// Directory used when the caller supplies none.
pub const DEFAULT_BASE_DIR: &str = "images";

/// The `srcset` / `sizes` pair for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveMarkup {
    pub srcset: String,
    pub sizes: String,
}

/// Normalize a caller-supplied base directory.
///
/// Blank or absent → [`DEFAULT_BASE_DIR`]. Trailing slashes are dropped so
/// candidates never contain `//`.
pub fn base_directory(base: Option<&str>) -> &str {
    let trimmed = base.map(str::trim).unwrap_or_default();
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_DIR
    } else {
        trimmed
    }
}

/// `(max-width: {w}px) 100vw, {w}px`
pub fn sizes_descriptor(natural_width: u32) -> String {
    format!("(max-width: {natural_width}px) 100vw, {natural_width}px")
}

/// Build the candidate list and sizes descriptor.
pub fn build_markup(result: &ProcessingResult, base: Option<&str>) -> ResponsiveMarkup {
    let dir = base_directory(base);
    let srcset = result
        .variants
        .iter()
        .map(|v| format!("{}/{} {}w", dir, v.file_name, v.width))
        .collect::<Vec<_>>()
        .join(", ");
    ResponsiveMarkup {
        srcset,
        sizes: result.sizes_attr.clone(),
    }
}

/// `srcset="…" sizes="…"`, ready to paste into an `<img>` tag.
pub fn attribute_snippet(result: &ProcessingResult, base: Option<&str>) -> String {
    let markup = build_markup(result, base);
    format!(r#"srcset="{}" sizes="{}""#, markup.srcset, markup.sizes)
}

/// A complete `<img>` element. `src` points at the largest variant.
pub fn img_tag(result: &ProcessingResult, base: Option<&str>, alt: &str) -> Markup {
    let dir = base_directory(base);
    let markup = build_markup(result, base);
    let largest = result.variants.last();
    html! {
        @if let Some(largest) = largest {
            img src=(format!("{}/{}", dir, largest.file_name))
                srcset=(markup.srcset)
                sizes=(markup.sizes)
                width=(largest.width)
                height=(largest.height)
                alt=(alt)
                loading="lazy"
                decoding="async";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_result;

    #[test]
    fn base_directory_defaults_and_trims() {
        assert_eq!(base_directory(None), "images");
        assert_eq!(base_directory(Some("")), "images");
        assert_eq!(base_directory(Some("   ")), "images");
        assert_eq!(base_directory(Some("/")), "images");
        assert_eq!(base_directory(Some("assets/img/")), "assets/img");
        assert_eq!(base_directory(Some(" static ")), "static");
    }

    #[test]
    fn sizes_descriptor_uses_natural_width() {
        assert_eq!(sizes_descriptor(1200), "(max-width: 1200px) 100vw, 1200px");
    }

    #[test]
    fn candidates_follow_variant_order() {
        let result = sample_result("photo", &[320, 480, 1200]);
        let markup = build_markup(&result, None);
        assert_eq!(
            markup.srcset,
            "images/photo-mob-sm.webp 320w, images/photo-mob.webp 480w, images/photo-desktop.webp 1200w"
        );
        assert_eq!(markup.sizes, "(max-width: 1200px) 100vw, 1200px");
    }

    #[test]
    fn regenerating_is_idempotent_and_non_mutating() {
        let result = sample_result("photo", &[320, 640]);
        let before = result.clone();

        let a = build_markup(&result, Some("cdn"));
        let _ = build_markup(&result, Some("other"));
        let b = build_markup(&result, Some("cdn"));

        assert_eq!(a, b);
        assert_eq!(result, before);
        assert!(a.srcset.starts_with("cdn/photo-"));
    }

    #[test]
    fn sizes_do_not_depend_on_directory() {
        let result = sample_result("photo", &[320, 640]);
        assert_eq!(
            build_markup(&result, Some("a")).sizes,
            build_markup(&result, Some("b")).sizes
        );
    }

    #[test]
    fn attribute_snippet_quotes_both() {
        let result = sample_result("cat", &[300]);
        assert_eq!(
            attribute_snippet(&result, Some("img")),
            r#"srcset="img/cat-mob-sm.webp 300w" sizes="(max-width: 300px) 100vw, 300px""#
        );
    }

    #[test]
    fn img_tag_points_at_largest_and_escapes_alt() {
        let result = sample_result("photo", &[320, 640]);
        let html = img_tag(&result, None, "a \"quoted\" <cat>").into_string();
        assert!(html.starts_with("<img "));
        assert!(html.contains(r#"src="images/photo-tablet.webp""#));
        assert!(html.contains(r#"width="640""#));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains("&lt;cat&gt;"));
    }
}
