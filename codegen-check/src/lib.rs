//! Resolvers generated by `perfkey::bridge::codegen` at build time, compiled as
//! ordinary modules.
//!
//! `build.rs` renders one source file per entry of `layouts::LAYOUTS`; each is
//! included below as a module named after the layout, so this crate only builds
//! if every generated file is valid Rust. `GENERATED` lists them in `LAYOUTS`
//! order for the tests.

pub mod layouts;

/// The items one generated file exposes.
pub struct Generated {
    pub name: &'static str,
    pub keys: &'static [&'static [u8]],
    pub resolve: fn(&[u8]) -> usize,
    pub find: fn(&[u8]) -> Option<usize>,
}

macro_rules! generated {
    ($($module:ident => $keys:ident, $resolve:ident, $find:ident;)*) => {
        $(
            pub mod $module {
                include!(concat!(env!("OUT_DIR"), "/", stringify!($module), ".rs"));
            }
        )*

        pub static GENERATED: &[Generated] = &[
            $(
                Generated {
                    name: stringify!($module),
                    keys: &$module::$keys,
                    resolve: $module::$resolve,
                    find: $module::$find,
                },
            )*
        ];
    };
}

generated! {
    none => NONE_KEYS, none_resolve, none_find;
    one => ONE_KEYS, one_resolve, one_find;
    pair => PAIR_KEYS, pair_resolve, pair_find;
    byte => BYTE_KEYS, byte_resolve, byte_find;
    first => FIRST_KEYS, first_resolve, first_find;
    blen => BLEN_KEYS, blen_resolve, blen_find;
    plen => PLEN_KEYS, plen_resolve, plen_find;
    simd => SIMD_KEYS, simd_resolve, simd_find;
    forced => FORCED_KEYS, forced_resolve, forced_find;
}
