use winreg::enums::{HKEY_CLASSES_ROOT, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
use winreg::RegKey;

use super::{split_root, RegistryView, RootKey};

/// `RegistryView` over the real registry. Reads go through `HKEY_CLASSES_ROOT`
/// so the machine view is the merged one the shell itself sees.
pub struct LiveRegistry;

impl RegistryView for LiveRegistry {
    fn read_default(&self, key: &str) -> Option<String> {
        let (root, sub) = split_root(key)?;
        let value = hive(root)
            .open_subkey(sub)
            .ok()?
            .get_value::<String, _>("")
            .ok();
        log::trace!("read {} -> {:?}", key, value);
        value
    }
}

fn hive(root: RootKey) -> RegKey {
    match root {
        RootKey::ClassesRoot => RegKey::predef(HKEY_CLASSES_ROOT),
        RootKey::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        RootKey::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
    }
}
