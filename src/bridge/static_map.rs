// In: src/bridge/static_map.rs

//! Process-wide, build-once key maps.
//!
//! A shape's key set never changes, so its map is built the first time a parser
//! needs it and then lives for the rest of the process. `KeyMapCell` is
//! const-constructible, so it can sit in a `static`; `static_key_map!` declares
//! one per shape.

use std::sync::OnceLock;

use crate::bridge::key_map::KeyMap;
use crate::error::KeyMapError;

/// A lazily built `KeyMap` that can live in a `static`.
pub struct KeyMapCell {
    map: OnceLock<KeyMap>,
    init: fn() -> Result<KeyMap, KeyMapError>,
}

impl KeyMapCell {
    pub const fn new(init: fn() -> Result<KeyMap, KeyMapError>) -> Self {
        Self {
            map: OnceLock::new(),
            init,
        }
    }

    /// Builds the map on first use. A failed build is returned and retried on the
    /// next call; if two threads race, one result wins and both observe it.
    pub fn try_get(&self) -> Result<&KeyMap, KeyMapError> {
        if let Some(map) = self.map.get() {
            return Ok(map);
        }
        let built = (self.init)()?;
        let _ = self.map.set(built);
        self.map.get().ok_or_else(|| {
            KeyMapError::InternalError("key map cell empty after initialization".to_string())
        })
    }

    /// Builds the map on first use.
    ///
    /// # Panics
    /// Panics if the build fails. A key set that cannot be laid out is a defect
    /// in the program, not a condition to recover from.
    pub fn get(&self) -> &KeyMap {
        match self.try_get() {
            Ok(map) => map,
            Err(e) => panic!("failed to build static key map: {}", e),
        }
    }

    /// The map, if it has already been built.
    pub fn get_if_built(&self) -> Option<&KeyMap> {
        self.map.get()
    }
}

impl std::fmt::Debug for KeyMapCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMapCell")
            .field("map", &self.map.get())
            .finish_non_exhaustive()
    }
}

/// Declares a process-wide `KeyMapCell`.
///
/// # Example
/// ```
/// use perfkey::static_key_map;
///
/// static_key_map!(static USER_KEYS = ["id", "name", "email"]);
///
/// let map = USER_KEYS.get();
/// assert_eq!(map.find(b"name"), Some(1));
/// assert_eq!(map.find(b"nope"), None);
/// ```
///
/// A type implementing `FieldKeys` can be named instead of a list:
/// `static_key_map!(pub static USER_KEYS: User);`
#[macro_export]
macro_rules! static_key_map {
    ($vis:vis static $name:ident = [$($key:expr),* $(,)?]) => {
        $vis static $name: $crate::bridge::KeyMapCell = $crate::bridge::KeyMapCell::new(|| {
            let names: &[&str] = &[$($key),*];
            $crate::bridge::KeyMap::from_names(names, &$crate::config::KeyMapConfig::default())
        });
    };
    ($vis:vis static $name:ident : $shape:ty) => {
        $vis static $name: $crate::bridge::KeyMapCell = $crate::bridge::KeyMapCell::new(|| {
            $crate::bridge::KeyMap::for_type::<$shape>(&$crate::config::KeyMapConfig::default())
        });
    };
}
