//! Optional TOML configuration, read from `winthumb-ctl.toml` next to the
//! executable. Everything works without it; it exists to relocate the
//! handler DLL and to teach the tool about formats the built-in catalog does
//! not carry.
//!
//! ```toml
//! dll = 'C:\Tools\winthumb_providers.dll'
//!
//! [[formats]]
//! extension = ".tga"
//! handler = "{11111111-2222-3333-4444-555555555555}"
//! description = "Targa Image"
//! category = "images"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{self, FormatAssociation, FormatCategory};
use crate::registry::{is_guid_shaped, HandlerId};
use crate::Error;

pub const CONFIG_FILE_NAME: &str = "winthumb-ctl.toml";

/// Name the handler DLL ships under when it sits next to this executable.
pub const DEFAULT_DLL_NAME: &str = "winthumb_providers.dll";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Handler DLL to (un)register, overriding the exe-relative default.
    pub dll: Option<PathBuf>,
    /// Extra catalog rows, or replacements for built-in ones.
    #[serde(default)]
    pub formats: Vec<FormatOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatOverride {
    pub extension: String,
    pub handler: String,
    pub description: String,
    pub category: FormatCategory,
}

impl Config {
    /// Reads and validates `path`. A missing file is not an error, just the
    /// defaults; a present-but-broken file is reported rather than ignored.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(Error::Config {
                    path: path.to_owned(),
                    message: err.to_string(),
                })
            }
        };
        let config = Self::parse(&text, path)?;
        log::debug!(
            "loaded {} ({} format overrides)",
            path.display(),
            config.formats.len()
        );
        Ok(config)
    }

    pub fn load_near_exe() -> Result<Self, Error> {
        match exe_dir() {
            Some(dir) => Self::load(&dir.join(CONFIG_FILE_NAME)),
            None => {
                log::warn!("cannot determine the executable directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, Error> {
        let config: Config = toml::from_str(text).map_err(|err| Error::Config {
            path: origin.to_owned(),
            message: err.to_string(),
        })?;
        for entry in &config.formats {
            if !is_guid_shaped(&entry.handler) {
                return Err(Error::Config {
                    path: origin.to_owned(),
                    message: format!(
                        "handler for {} must be a braced GUID, got {:?}",
                        entry.extension, entry.handler
                    ),
                });
            }
        }
        Ok(config)
    }

    /// Merges the overrides into a catalog listing. An entry whose extension
    /// is already listed replaces that row's handler and description; new
    /// extensions are appended when they pass the same category filter the
    /// listing was built with.
    pub fn apply(&self, list: &mut Vec<FormatAssociation>, category: Option<FormatCategory>) {
        for entry in &self.formats {
            let extension = catalog::normalize_extension(&entry.extension);
            if let Some(existing) = list.iter_mut().find(|a| a.extension == extension) {
                existing.handler = HandlerId::new(entry.handler.clone());
                existing.description = entry.description.clone();
                continue;
            }
            if category.map_or(true, |wanted| entry.category == wanted) {
                list.push(FormatAssociation::new(
                    entry.category,
                    &extension,
                    HandlerId::new(entry.handler.clone()),
                    &entry.description,
                ));
            }
        }
    }

    /// The DLL the register/unregister commands act on: an explicit path
    /// wins, then the config entry, then `DEFAULT_DLL_NAME` next to the
    /// executable.
    pub fn resolve_dll_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_owned();
        }
        if let Some(path) = &self.dll {
            return path.clone();
        }
        match exe_dir() {
            Some(dir) => dir.join(DEFAULT_DLL_NAME),
            None => PathBuf::from(DEFAULT_DLL_NAME),
        }
    }
}

fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(Path::to_owned)
}
