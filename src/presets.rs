//! Named size presets.
//!
//! A preset maps a stable label (`"mobile"`, `"tablet"`, ...) to a canonical
//! pixel width and, usually, a short filename suffix. The table is ordered:
//! insertion order is the tie-break priority when several labels land on the
//! same width.
//!
//! ```text
//! small-mobile   320   mob-sm
//! mobile         480   mob
//! card           640   (none, named by the numeric fallback)
//! tablet         768   tablet
//! desktop       1024   desktop
//! large         1536   mob-lg
//! ```
//!
//! The table is built once and handed to the width resolver and the suffix
//! mapper explicitly. There is no global instance.

/// A single named breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePreset {
    pub label: &'static str,
    pub width: u32,
    /// Short filename suffix. `None` means the preset is named by its width.
    pub suffix: Option<&'static str>,
}

const STANDARD: &[SizePreset] = &[
    SizePreset {
        label: "small-mobile",
        width: 320,
        suffix: Some("mob-sm"),
    },
    SizePreset {
        label: "mobile",
        width: 480,
        suffix: Some("mob"),
    },
    SizePreset {
        label: "card",
        width: 640,
        suffix: None,
    },
    SizePreset {
        label: "tablet",
        width: 768,
        suffix: Some("tablet"),
    },
    SizePreset {
        label: "desktop",
        width: 1024,
        suffix: Some("desktop"),
    },
    SizePreset {
        label: "large",
        width: 1536,
        suffix: Some("mob-lg"),
    },
];

/// Immutable, ordered preset table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTable {
    presets: Vec<SizePreset>,
}

impl PresetTable {
    pub fn new(presets: Vec<SizePreset>) -> Self {
        Self { presets }
    }

    /// The stock table shipped with the tool.
    pub fn standard() -> Self {
        Self::new(STANDARD.to_vec())
    }

    /// Look up a preset by its exact (case-sensitive) label.
    pub fn get(&self, label: &str) -> Option<&SizePreset> {
        self.presets.iter().find(|p| p.label == label)
    }

    /// First preset, in table order, whose width is exactly `width`.
    pub fn for_width(&self, width: u32) -> Option<&SizePreset> {
        self.presets.iter().find(|p| p.width == width)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SizePreset> {
        self.presets.iter()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.presets.iter().map(|p| p.label).collect()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_order() {
        let table = PresetTable::standard();
        assert_eq!(
            table.labels(),
            vec!["small-mobile", "mobile", "card", "tablet", "desktop", "large"]
        );
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = PresetTable::standard();
        assert_eq!(table.get("tablet").map(|p| p.width), Some(768));
        assert!(table.get("Tablet").is_none());
    }

    #[test]
    fn card_has_no_suffix() {
        let table = PresetTable::standard();
        assert_eq!(table.get("card").unwrap().suffix, None);
    }

    #[test]
    fn for_width_prefers_table_order() {
        let table = PresetTable::new(vec![
            SizePreset {
                label: "first",
                width: 500,
                suffix: Some("a"),
            },
            SizePreset {
                label: "second",
                width: 500,
                suffix: Some("b"),
            },
        ]);
        assert_eq!(table.for_width(500).unwrap().label, "first");
        assert!(table.for_width(501).is_none());
    }
}
