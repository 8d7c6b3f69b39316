//! Decides whether a given handler is the active thumbnail provider for an
//! extension.
//!
//! The shell consults several places when it picks a provider; this resolver
//! probes them in one fixed order and reports the first tier whose value
//! matches the handler. A tier that holds some other provider does not stop
//! the search: our handler may still be reachable through a later tier, and
//! reporting it inactive there would be wrong.

use std::fmt;

use crate::registry::{
    extension_key, progid_key, progid_of, system_assoc_key, AssocScope, HandlerId, RegistryView,
};

/// Which registry tier made the handler active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveVia {
    /// `HKEY_CLASSES_ROOT\<ext>\shellex\{catid}` (merged machine view).
    MachineExtension,
    /// `HKEY_CURRENT_USER\Software\Classes\<ext>\shellex\{catid}`.
    UserExtension,
    /// The extension's ProgID class carries the handler.
    ProgId(String),
    /// `HKEY_CLASSES_ROOT\SystemFileAssociations\<ext>\shellex\{catid}`.
    SystemFileAssociations,
}

impl fmt::Display for ActiveVia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveVia::MachineExtension => f.write_str("extension key"),
            ActiveVia::UserExtension => f.write_str("extension key (per-user)"),
            ActiveVia::ProgId(progid) => write!(f, "ProgID {}", progid),
            ActiveVia::SystemFileAssociations => f.write_str("SystemFileAssociations"),
        }
    }
}

/// Probes the tiers in order and returns the first match, or `None` when the
/// handler is not wired up anywhere. Read failures count as "no value here".
pub fn resolve_active(
    view: &dyn RegistryView,
    extension: &str,
    handler: &HandlerId,
) -> Option<ActiveVia> {
    let holds_handler = |key: &str| {
        view.read_default(key)
            .map_or(false, |value| handler.matches(&value))
    };

    if holds_handler(&extension_key(AssocScope::Machine, extension)) {
        return Some(ActiveVia::MachineExtension);
    }
    if holds_handler(&extension_key(AssocScope::User, extension)) {
        return Some(ActiveVia::UserExtension);
    }
    if let Some(progid) = progid_of(view, extension) {
        if holds_handler(&progid_key(&progid)) {
            return Some(ActiveVia::ProgId(progid));
        }
    }
    if holds_handler(&system_assoc_key(extension)) {
        return Some(ActiveVia::SystemFileAssociations);
    }
    None
}

pub fn is_active(view: &dyn RegistryView, extension: &str, handler: &HandlerId) -> bool {
    resolve_active(view, extension, handler).is_some()
}

/// Every key a guarded removal must consider for `extension`, in the same
/// order the resolver probes them. Candidates are only enumerated here; the
/// value check happens at removal time.
pub fn removal_candidates(view: &dyn RegistryView, extension: &str) -> Vec<String> {
    let mut keys = vec![
        extension_key(AssocScope::Machine, extension),
        extension_key(AssocScope::User, extension),
    ];
    if let Some(progid) = progid_of(view, extension) {
        keys.push(progid_key(&progid));
    }
    keys.push(system_assoc_key(extension));
    keys
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    struct MapView(BTreeMap<String, String>);

    impl MapView {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl RegistryView for MapView {
        fn read_default(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
    }

    const OBJ_HANDLER: &str = "{650a0a50-3a8c-49ca-ba26-13b31965b8ef}";
    const OTHER: &str = "{00000000-1111-2222-3333-444444444444}";

    #[test]
    fn empty_registry_means_inactive() {
        let view = MapView::new(&[]);
        let handler = HandlerId::new(OBJ_HANDLER);
        assert_eq!(resolve_active(&view, ".obj", &handler), None);
    }

    #[test]
    fn foreign_value_in_one_tier_does_not_hide_a_later_match() {
        // The direct extension key belongs to another provider, but the
        // fallback still carries ours; the handler counts as active.
        let view = MapView::new(&[
            (
                r"HKEY_CLASSES_ROOT\.obj\shellex\{e357fccd-a995-4576-b01f-234630154e96}",
                OTHER,
            ),
            (
                r"HKEY_CLASSES_ROOT\SystemFileAssociations\.obj\shellex\{e357fccd-a995-4576-b01f-234630154e96}",
                OBJ_HANDLER,
            ),
        ]);
        let handler = HandlerId::new(OBJ_HANDLER);
        assert_eq!(
            resolve_active(&view, ".obj", &handler),
            Some(ActiveVia::SystemFileAssociations)
        );
    }

    #[test]
    fn progid_tier_wins_over_fallback() {
        let view = MapView::new(&[
            (r"HKEY_CLASSES_ROOT\.tga", "tgafile"),
            (
                r"HKEY_CLASSES_ROOT\tgafile\shellex\{e357fccd-a995-4576-b01f-234630154e96}",
                OBJ_HANDLER,
            ),
            (
                r"HKEY_CLASSES_ROOT\SystemFileAssociations\.tga\shellex\{e357fccd-a995-4576-b01f-234630154e96}",
                OBJ_HANDLER,
            ),
        ]);
        let handler = HandlerId::new(OBJ_HANDLER);
        assert_eq!(
            resolve_active(&view, ".tga", &handler),
            Some(ActiveVia::ProgId("tgafile".to_string()))
        );
    }

    #[test]
    fn empty_progid_value_is_skipped() {
        let view = MapView::new(&[(r"HKEY_CLASSES_ROOT\.tga", "")]);
        let handler = HandlerId::new(OBJ_HANDLER);
        assert_eq!(resolve_active(&view, ".tga", &handler), None);
        // No ProgID candidate shows up for removal either.
        let keys = removal_candidates(&view, ".tga");
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn match_is_case_insensitive() {
        let view = MapView::new(&[(
            r"HKEY_CLASSES_ROOT\.obj\shellex\{e357fccd-a995-4576-b01f-234630154e96}",
            "{650A0A50-3A8C-49CA-BA26-13B31965B8EF}",
        )]);
        let handler = HandlerId::new(OBJ_HANDLER);
        assert_eq!(
            resolve_active(&view, ".obj", &handler),
            Some(ActiveVia::MachineExtension)
        );
    }

    #[test]
    fn removal_candidates_follow_probe_order() {
        let view = MapView::new(&[(r"HKEY_CLASSES_ROOT\.tga", "tgafile")]);
        let keys = removal_candidates(&view, ".tga");
        assert_eq!(
            keys,
            vec![
                r"HKEY_CLASSES_ROOT\.tga\shellex\{e357fccd-a995-4576-b01f-234630154e96}"
                    .to_string(),
                r"HKEY_CURRENT_USER\Software\Classes\.tga\shellex\{e357fccd-a995-4576-b01f-234630154e96}"
                    .to_string(),
                r"HKEY_CLASSES_ROOT\tgafile\shellex\{e357fccd-a995-4576-b01f-234630154e96}"
                    .to_string(),
                r"HKEY_CLASSES_ROOT\SystemFileAssociations\.tga\shellex\{e357fccd-a995-4576-b01f-234630154e96}"
                    .to_string(),
            ]
        );
    }
}
