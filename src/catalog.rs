//! Built-in catalog of file formats the handler suite covers, grouped the way
//! the providers themselves are grouped (one provider CLSID per format, one
//! shared CLSID for the plain-text family).

use std::fmt;

use serde::Deserialize;

use crate::registry::{HandlerId, RegistryView};
use crate::resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatCategory {
    #[serde(rename = "3d", alias = "models")]
    Models,
    Images,
    Text,
    Documents,
}

impl FormatCategory {
    pub const ALL: [FormatCategory; 4] = [
        FormatCategory::Models,
        FormatCategory::Images,
        FormatCategory::Text,
        FormatCategory::Documents,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormatCategory::Models => "3D models",
            FormatCategory::Images => "Images",
            FormatCategory::Text => "Text",
            FormatCategory::Documents => "Documents",
        }
    }
}

impl fmt::Display for FormatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the built-in catalog.
pub struct FormatDef {
    pub category: FormatCategory,
    pub extension: &'static str,
    pub handler: &'static str,
    pub description: &'static str,
}

#[rustfmt::skip]
pub const FORMATS: &[FormatDef] = &[
    FormatDef { category: FormatCategory::Models, extension: ".obj",  handler: "{650a0a50-3a8c-49ca-ba26-13b31965b8ef}", description: "Wavefront Object" },
    FormatDef { category: FormatCategory::Models, extension: ".fbx",  handler: "{bf2644df-ae9c-4524-8bfd-2d531b837e97}", description: "Filmbox" },
    FormatDef { category: FormatCategory::Models, extension: ".stl",  handler: "{b9bcfb2d-6dc4-43a0-b161-64ca282a20ff}", description: "Stereolithography" },
    FormatDef { category: FormatCategory::Models, extension: ".dae",  handler: "{7cacb561-20c5-4b90-bd1c-5aba58b978ca}", description: "Collada" },
    FormatDef { category: FormatCategory::Models, extension: ".ply",  handler: "{b0225f87-babe-4d50-92a9-37c3c668a3e4}", description: "Polygon File Format" },
    FormatDef { category: FormatCategory::Models, extension: ".x3d",  handler: "{145e37f5-99a1-40f4-b74a-6534524f29ba}", description: "X3D" },
    FormatDef { category: FormatCategory::Models, extension: ".x3db", handler: "{1ba6aa5e-ac9a-4d3a-bcd5-678e0669fb27}", description: "X3D Binary" },
    FormatDef { category: FormatCategory::Models, extension: ".3ds",  handler: "{93c86d4a-6432-43e2-9082-64bdb6cbfa43}", description: "3D Studio" },
    FormatDef { category: FormatCategory::Models, extension: ".3mf",  handler: "{442657d4-0325-4632-9154-116584281358}", description: "3D Manufacturing Format" },
    FormatDef { category: FormatCategory::Models, extension: ".stp",  handler: "{552657d4-0325-4632-9154-116584281359}", description: "STEP File" },
    FormatDef { category: FormatCategory::Models, extension: ".step", handler: "{662657d4-0325-4632-9154-116584281360}", description: "STEP File" },
    FormatDef { category: FormatCategory::Models, extension: ".iges", handler: "{772657d4-0325-4632-9154-116584281361}", description: "IGES File" },
    FormatDef { category: FormatCategory::Models, extension: ".igs",  handler: "{882657d4-0325-4632-9154-116584281362}", description: "IGES File" },
    FormatDef { category: FormatCategory::Models, extension: ".gltf", handler: "{d13b767b-a97f-4753-a4a3-7c7c15f6b25c}", description: "GL Transmission Format" },
    FormatDef { category: FormatCategory::Models, extension: ".glb",  handler: "{99ff43f0-d914-4a7a-8325-a8013995c41d}", description: "GL Transmission Format Binary" },

    FormatDef { category: FormatCategory::Images, extension: ".psd",  handler: "{aa2657d4-0325-4632-9154-116584281363}", description: "Adobe Photoshop Document" },
    FormatDef { category: FormatCategory::Images, extension: ".ai",   handler: "{112657d4-0325-4632-9154-116584281369}", description: "Adobe Illustrator Artwork" },
    FormatDef { category: FormatCategory::Images, extension: ".exr",  handler: "{dd2657d4-0325-4632-9154-116584281366}", description: "OpenEXR High Dynamic-Range" },
    FormatDef { category: FormatCategory::Images, extension: ".hdr",  handler: "{cc2657d4-0325-4632-9154-116584281365}", description: "Radiance RGBE" },
    FormatDef { category: FormatCategory::Images, extension: ".hdri", handler: "{222657d4-0325-4632-9154-116584281370}", description: "Radiance RGBE" },

    // The text provider renders every plain-text family member itself, so
    // all of these share a single handler CLSID.
    FormatDef { category: FormatCategory::Text, extension: ".txt",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Text Document" },
    FormatDef { category: FormatCategory::Text, extension: ".rs",   handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Rust Source File" },
    FormatDef { category: FormatCategory::Text, extension: ".json", handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "JSON File" },
    FormatDef { category: FormatCategory::Text, extension: ".xml",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "XML Document" },
    FormatDef { category: FormatCategory::Text, extension: ".md",   handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Markdown File" },
    FormatDef { category: FormatCategory::Text, extension: ".log",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Log File" },
    FormatDef { category: FormatCategory::Text, extension: ".ini",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Configuration File" },
    FormatDef { category: FormatCategory::Text, extension: ".cfg",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "Configuration File" },
    FormatDef { category: FormatCategory::Text, extension: ".yaml", handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "YAML Document" },
    FormatDef { category: FormatCategory::Text, extension: ".yml",  handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "YAML Document" },
    FormatDef { category: FormatCategory::Text, extension: ".toml", handler: "{bb2657d4-0325-4632-9154-116584281364}", description: "TOML Configuration" },

    FormatDef { category: FormatCategory::Documents, extension: ".pdf",  handler: "{ff2657d4-0325-4632-9154-116584281368}", description: "Portable Document Format" },
    FormatDef { category: FormatCategory::Documents, extension: ".epub", handler: "{ee2657d4-0325-4632-9154-116584281367}", description: "EPUB E-Book" },
    FormatDef { category: FormatCategory::Documents, extension: ".docx", handler: "{332657d4-0325-4632-9154-116584281371}", description: "Word Document" },
];

/// A catalog entry together with its last observed activation state.
/// `active` is a cached snapshot; it only changes when `refresh` is called.
#[derive(Debug, Clone)]
pub struct FormatAssociation {
    pub category: FormatCategory,
    pub extension: String,
    pub handler: HandlerId,
    pub description: String,
    pub active: bool,
}

impl FormatAssociation {
    pub fn new(
        category: FormatCategory,
        extension: &str,
        handler: HandlerId,
        description: &str,
    ) -> Self {
        Self {
            category,
            extension: normalize_extension(extension),
            handler,
            description: description.to_string(),
            active: false,
        }
    }

    fn from_def(def: &FormatDef) -> Self {
        Self::new(
            def.category,
            def.extension,
            HandlerId::new(def.handler),
            def.description,
        )
    }

    /// Recomputes `active` from the registry.
    pub fn refresh(&mut self, view: &dyn RegistryView) {
        self.active = resolver::is_active(view, &self.extension, &self.handler);
    }
}

/// Lowercases and prepends the dot if missing, so `OBJ`, `obj` and `.obj`
/// all name the same association.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_ascii_lowercase();
    if trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// Builds fresh associations from the built-in table, optionally limited to
/// one category, ordered by category then extension. All start out with
/// `active == false` until refreshed.
pub fn associations(category: Option<FormatCategory>) -> Vec<FormatAssociation> {
    let mut list: Vec<FormatAssociation> = FORMATS
        .iter()
        .filter(|def| category.map_or(true, |wanted| def.category == wanted))
        .map(FormatAssociation::from_def)
        .collect();
    list.sort_by(|a, b| (a.category, &a.extension).cmp(&(b.category, &b.extension)));
    list
}

/// Built-in table lookup by extension, tolerant of case and a missing dot.
pub fn find(extension: &str) -> Option<&'static FormatDef> {
    let wanted = normalize_extension(extension);
    FORMATS.iter().find(|def| def.extension == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::is_guid_shaped;
    use std::collections::BTreeSet;

    #[test]
    fn table_is_well_formed() {
        let mut seen = BTreeSet::new();
        for def in FORMATS {
            assert!(
                def.extension.starts_with('.'),
                "{} lacks a leading dot",
                def.extension
            );
            assert_eq!(
                def.extension,
                def.extension.to_ascii_lowercase(),
                "{} is not lowercase",
                def.extension
            );
            assert!(
                is_guid_shaped(def.handler),
                "{} has a malformed handler id",
                def.extension
            );
            assert!(!def.description.is_empty());
            assert!(seen.insert(def.extension), "{} listed twice", def.extension);
        }
    }

    #[test]
    fn text_family_shares_one_handler() {
        let handlers: BTreeSet<&str> = FORMATS
            .iter()
            .filter(|def| def.category == FormatCategory::Text)
            .map(|def| def.handler)
            .collect();
        assert_eq!(handlers.len(), 1);
    }

    #[test]
    fn find_tolerates_case_and_missing_dot() {
        assert_eq!(find(".obj").map(|d| d.handler), find("OBJ").map(|d| d.handler));
        assert_eq!(
            find(".obj").map(|d| d.handler),
            Some("{650a0a50-3a8c-49ca-ba26-13b31965b8ef}")
        );
        assert!(find(".nope").is_none());
    }

    #[test]
    fn normalize_extension_forms() {
        assert_eq!(normalize_extension(".OBJ"), ".obj");
        assert_eq!(normalize_extension("obj"), ".obj");
        assert_eq!(normalize_extension("  .Stl "), ".stl");
    }

    #[test]
    fn associations_filter_and_order() {
        let all = associations(None);
        assert_eq!(all.len(), FORMATS.len());
        let pairs: Vec<(FormatCategory, String)> = all
            .iter()
            .map(|a| (a.category, a.extension.clone()))
            .collect();
        let sorted = {
            let mut copy = pairs.clone();
            copy.sort();
            copy
        };
        assert_eq!(pairs, sorted);

        let docs = associations(Some(FormatCategory::Documents));
        assert_eq!(docs.len(), 3);
        assert!(docs.iter().all(|a| a.category == FormatCategory::Documents));
    }
}
