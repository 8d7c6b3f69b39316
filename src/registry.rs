//! Registry key layout for per-extension thumbnail-handler associations.
//!
//! The shell looks up the active `IThumbnailProvider` for a file type under
//! `<ext>\shellex\{e357fccd-...}`, where the braced GUID is the fixed handler
//! category, not any particular provider. This module builds those key paths
//! and defines the read seam the resolver works through.

use std::fmt;

#[cfg(windows)]
pub mod live;
#[cfg(windows)]
pub use live::LiveRegistry;

/// Key suffix identifying the shell's thumbnail-provider extension point.
/// Shared by every file extension; the per-provider CLSID is stored as the
/// default value underneath it.
pub const THUMBNAIL_HANDLER_CATID: &str = "{e357fccd-a995-4576-b01f-234630154e96}";

/// Which `Software\Classes` tier a mutation targets.
///
/// `Machine` is the merged `HKEY_CLASSES_ROOT` view (writes land in
/// `HKLM\Software\Classes` and need elevation); `User` is the caller's own
/// `HKCU\Software\Classes` hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssocScope {
    Machine,
    User,
}

impl AssocScope {
    pub fn classes_root(self) -> &'static str {
        match self {
            AssocScope::Machine => "HKEY_CLASSES_ROOT",
            AssocScope::User => r"HKEY_CURRENT_USER\Software\Classes",
        }
    }
}

impl fmt::Display for AssocScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssocScope::Machine => f.write_str("machine"),
            AssocScope::User => f.write_str("user"),
        }
    }
}

/// `<root>\<ext>\shellex\{catid}`: the key whose default value names the
/// active thumbnail provider for `extension`.
pub fn extension_key(scope: AssocScope, extension: &str) -> String {
    format!(
        r"{}\{}\shellex\{}",
        scope.classes_root(),
        extension,
        THUMBNAIL_HANDLER_CATID
    )
}

/// `HKEY_CLASSES_ROOT\<ext>`, whose default value is the extension's ProgID.
pub fn extension_root_key(extension: &str) -> String {
    format!(r"HKEY_CLASSES_ROOT\{}", extension)
}

/// The thumbnail-provider key under a ProgID class.
pub fn progid_key(progid: &str) -> String {
    format!(
        r"HKEY_CLASSES_ROOT\{}\shellex\{}",
        progid, THUMBNAIL_HANDLER_CATID
    )
}

/// The fallback key under `SystemFileAssociations`.
pub fn system_assoc_key(extension: &str) -> String {
    format!(
        r"HKEY_CLASSES_ROOT\SystemFileAssociations\{}\shellex\{}",
        extension, THUMBNAIL_HANDLER_CATID
    )
}

/// Read access to default (unnamed) registry values.
///
/// The resolver only ever reads; every failure mode (missing key, missing
/// value, wrong type, access denied) collapses to `None`.
pub trait RegistryView {
    fn read_default(&self, key: &str) -> Option<String>;
}

/// Default value of `HKEY_CLASSES_ROOT\<ext>`, if it names a ProgID.
pub fn progid_of(view: &dyn RegistryView, extension: &str) -> Option<String> {
    view.read_default(&extension_root_key(extension))
        .filter(|progid| !progid.is_empty())
}

/// Registry hives this tool touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKey {
    ClassesRoot,
    CurrentUser,
    LocalMachine,
}

/// Splits `HKEY_CLASSES_ROOT\.obj\shellex\...` into the hive and the subkey
/// path below it. Root names are matched case-insensitively, long or short.
pub fn split_root(key: &str) -> Option<(RootKey, &str)> {
    let (root, rest) = match key.split_once('\\') {
        Some((root, rest)) => (root, rest),
        None => (key, ""),
    };
    let hive = match root.to_ascii_uppercase().as_str() {
        "HKEY_CLASSES_ROOT" | "HKCR" => RootKey::ClassesRoot,
        "HKEY_CURRENT_USER" | "HKCU" => RootKey::CurrentUser,
        "HKEY_LOCAL_MACHINE" | "HKLM" => RootKey::LocalMachine,
        _ => return None,
    };
    Some((hive, rest))
}

/// Opaque identifier of a registered thumbnail handler. GUID-shaped in
/// practice, but only ever compared as a string, ASCII-case-insensitively,
/// since the registry preserves whatever casing was written.
#[derive(Debug, Clone)]
pub struct HandlerId(String);

impl HandlerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw registry value.
    pub fn matches(&self, value: &str) -> bool {
        self.0.eq_ignore_ascii_case(value)
    }
}

impl PartialEq for HandlerId {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for HandlerId {}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// `{8-4-4-4-12}` hex digits in braces.
pub fn is_guid_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 38 || bytes[0] != b'{' || bytes[37] != b'}' {
        return false;
    }
    value[1..37].char_indices().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => c == '-',
        _ => c.is_ascii_hexdigit(),
    })
}
