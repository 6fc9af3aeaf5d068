// In: src/bridge/codegen.rs

//! Source generation for build scripts.
//!
//! `emit` turns a built `KeyMap` into Rust source: the key table, the lookup
//! tables as `static` literals, and a resolve function hard-wired to the one
//! layout that was chosen. Nothing is decided at run time; the generated code
//! only indexes tables.
//!
//! For the SIMD layout the generated code hashes with this crate's `const fn`
//! `KeyHasher`, and a `const` assertion re-hashes the first key at compile time,
//! so a table emitted by one build of the hasher cannot be used with another.
//!
//! Typical use is from `build.rs`:
//!
//! ```ignore
//! let map = KeyMap::from_names(["id", "name"], &KeyMapConfig::default())?;
//! let source = codegen::emit(&map, &CodegenOptions::new("user"))?;
//! std::fs::write(out_dir.join("user_keys.rs"), source)?;
//! ```

use std::fmt::{self, Write};

use crate::bridge::key_map::KeyMap;
use crate::error::KeyMapError;
use crate::planner::builder::{Tables, BYTE_LENGTH_SLOTS, NO_COLUMN};

/// Numbers per line in emitted array literals.
const VALUES_PER_LINE: usize = 16;

/// Naming and path settings for generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Base identifier: items are named `{NAME}_KEYS`, `{name}_resolve`, ...
    pub name: String,
    /// Path under which this crate is reachable from the generated code.
    pub crate_path: String,
}

impl CodegenOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crate_path: "::perfkey".to_string(),
        }
    }

    pub fn with_crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    fn validate(&self) -> Result<(), KeyMapError> {
        let mut chars = self.name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(KeyMapError::InvalidConfig(format!(
                "codegen name {:?} is not a valid Rust identifier",
                self.name
            )));
        }
        Ok(())
    }
}

/// Emits Rust source implementing `map`'s lookup with no runtime dispatch.
pub fn emit(map: &KeyMap, options: &CodegenOptions) -> Result<String, KeyMapError> {
    options.validate()?;
    let mut out = String::new();
    Emitter {
        map,
        lower: options.name.to_ascii_lowercase(),
        upper: options.name.to_ascii_uppercase(),
        krate: &options.crate_path,
    }
    .emit(&mut out)
    .map_err(|e| KeyMapError::InternalError(format!("failed to format generated code: {}", e)))?;
    Ok(out)
}

struct Emitter<'a> {
    map: &'a KeyMap,
    lower: String,
    upper: String,
    krate: &'a str,
}

impl Emitter<'_> {
    fn emit(&self, out: &mut String) -> fmt::Result {
        let n = self.map.len();
        let upper = &self.upper;

        writeln!(out, "// @generated by perfkey codegen. Do not edit.")?;
        writeln!(
            out,
            "// strategy: {} | keys: {}",
            self.map.strategy().tag(),
            n
        )?;
        writeln!(out)?;
        writeln!(out, "/// Number of keys; also the \"not found\" value.")?;
        writeln!(out, "pub const {upper}_KEY_COUNT: usize = {n};")?;
        write!(out, "pub static {upper}_KEYS: [&[u8]; {n}] = [")?;
        for (i, key) in self.map.keys().iter().enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}", byte_string(key))?;
        }
        writeln!(out, "];")?;
        writeln!(out)?;

        self.emit_tables(out)?;

        writeln!(out, "/// Candidate lookup; verify against `{upper}_KEYS` before use.")?;
        writeln!(out, "#[inline]")?;
        writeln!(out, "pub fn {}_resolve(input: &[u8]) -> usize {{", self.lower)?;
        self.emit_body(out)?;
        writeln!(out, "}}")?;
        writeln!(out)?;

        writeln!(out, "/// Verified lookup of a complete key.")?;
        writeln!(out, "#[inline]")?;
        writeln!(out, "pub fn {}_find(input: &[u8]) -> Option<usize> {{", self.lower)?;
        writeln!(out, "    let candidate = {}_resolve(input);", self.lower)?;
        writeln!(out, "    match {upper}_KEYS.get(candidate) {{")?;
        writeln!(out, "        Some(&key) if key == input => Some(candidate),")?;
        writeln!(out, "        _ => None,")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn emit_window(&self, out: &mut String) -> fmt::Result {
        let window = self.map.resolver().window();
        writeln!(
            out,
            "const {}_WINDOW: {krate}::kernels::LengthWindow = {krate}::kernels::LengthWindow::new({}, {}, {});",
            self.upper,
            window.min_len,
            window.max_len,
            window.delimiter,
            krate = self.krate
        )
    }

    fn emit_key_len(&self, out: &mut String) -> fmt::Result {
        let upper = &self.upper;
        writeln!(out, "    let Some(len) = {upper}_WINDOW.key_len(input) else {{")?;
        writeln!(out, "        return {upper}_KEY_COUNT;")?;
        writeln!(out, "    }};")
    }

    fn emit_tables(&self, out: &mut String) -> fmt::Result {
        let upper = &self.upper;
        if self.map.strategy().tag().is_length_dependent() {
            self.emit_window(out)?;
        }
        match self.map.resolver().tables() {
            Tables::Empty | Tables::SingleElement | Tables::DoubleElement(_) => Ok(()),
            Tables::TripleElement(table) => {
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots)?;
                writeln!(out)
            }
            Tables::SingleByte(table) => {
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots[..])?;
                writeln!(out)
            }
            Tables::FirstByteAndUniqueIndex(table) => {
                emit_array(out, &format!("{upper}_COLUMNS"), "u8", &table.columns[..])?;
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots)?;
                writeln!(out)
            }
            Tables::UniqueByteAndLength(table) => {
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots)?;
                writeln!(out)
            }
            Tables::UniquePerLength(table) => {
                emit_array(out, &format!("{upper}_COLUMNS"), "u8", &table.columns)?;
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots)?;
                writeln!(out)
            }
            Tables::SimdFullLength(table) => {
                writeln!(
                    out,
                    "const {upper}_HASHER: {krate}::kernels::KeyHasher = {krate}::kernels::KeyHasher::new({:#x});",
                    table.hasher.seed(),
                    krate = self.krate
                )?;
                if let Some(first) = self.map.key(0) {
                    let expected = table.hasher.hash_prefix(first, table.prefix_len);
                    writeln!(
                        out,
                        "const _: () = assert!({upper}_HASHER.hash_prefix({}, {}) == {:#x});",
                        byte_string(first),
                        table.prefix_len,
                        expected
                    )?;
                }
                emit_array(out, &format!("{upper}_CONTROL"), "u8", &table.control)?;
                emit_array(out, &format!("{upper}_SLOTS"), "u16", &table.slots)?;
                writeln!(out)
            }
        }
    }

    fn emit_body(&self, out: &mut String) -> fmt::Result {
        let upper = &self.upper;
        let miss = format!("{upper}_KEY_COUNT");
        match self.map.resolver().tables() {
            Tables::Empty => {
                writeln!(out, "    let _ = input;")?;
                writeln!(out, "    {miss}")
            }
            Tables::SingleElement => {
                writeln!(out, "    let _ = input;")?;
                writeln!(out, "    0")
            }
            Tables::DoubleElement(table) => {
                writeln!(out, "    match input.get({}) {{", table.column)?;
                writeln!(out, "        Some(&byte) => {{")?;
                writeln!(out, "            let candidate = (byte & 1) as usize;")?;
                writeln!(
                    out,
                    "            if byte == [{}u8, {}u8][candidate] {{ candidate }} else {{ {miss} }}",
                    table.expected[0], table.expected[1]
                )?;
                writeln!(out, "        }}")?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::TripleElement(table) => {
                writeln!(out, "    match input.get({}) {{", table.column)?;
                writeln!(
                    out,
                    "        Some(&byte) => {upper}_SLOTS[(((byte ^ {}u8) as u64).wrapping_mul({:#x}) as usize) & 3] as usize,",
                    table.first_char, table.seed
                )?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::SingleByte(table) => {
                writeln!(out, "    match input.get({}) {{", table.column)?;
                writeln!(out, "        Some(&byte) => {upper}_SLOTS[byte as usize] as usize,")?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::FirstByteAndUniqueIndex(_) => {
                writeln!(out, "    let Some(&first) = input.first() else {{")?;
                writeln!(out, "        return {miss};")?;
                writeln!(out, "    }};")?;
                writeln!(out, "    let column = {upper}_COLUMNS[first as usize];")?;
                writeln!(out, "    if column == {NO_COLUMN} {{")?;
                writeln!(out, "        return {miss};")?;
                writeln!(out, "    }}")?;
                writeln!(out, "    match input.get(column as usize) {{")?;
                writeln!(
                    out,
                    "        Some(&byte) => {upper}_SLOTS[((first as usize) << 8) | byte as usize] as usize,"
                )?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::UniqueByteAndLength(table) => {
                self.emit_key_len(out)?;
                writeln!(out, "    match input.get({}) {{", table.column)?;
                writeln!(
                    out,
                    "        Some(&byte) => {upper}_SLOTS[((byte as usize) ^ len) & {}] as usize,",
                    BYTE_LENGTH_SLOTS - 1
                )?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::UniquePerLength(_) => {
                self.emit_key_len(out)?;
                writeln!(out, "    let column = {upper}_COLUMNS[len];")?;
                writeln!(out, "    if column == {NO_COLUMN} {{")?;
                writeln!(out, "        return {miss};")?;
                writeln!(out, "    }}")?;
                writeln!(out, "    match input.get(column as usize) {{")?;
                writeln!(
                    out,
                    "        Some(&byte) => {upper}_SLOTS[(len << 8) | byte as usize] as usize,"
                )?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
            Tables::SimdFullLength(table) => {
                self.emit_key_len(out)?;
                writeln!(
                    out,
                    "    let hash = {upper}_HASHER.hash_prefix(input, len.min({}));",
                    table.prefix_len
                )?;
                writeln!(
                    out,
                    "    let base = (((hash >> 8) as usize) & {}) * {};",
                    table.num_groups - 1,
                    table.bucket_width
                )?;
                writeln!(
                    out,
                    "    match {}::kernels::first_match(&{upper}_CONTROL[base..base + {}], hash as u8) {{",
                    self.krate, table.bucket_width
                )?;
                writeln!(out, "        Some(lane) => {upper}_SLOTS[base + lane] as usize,")?;
                writeln!(out, "        None => {miss},")?;
                writeln!(out, "    }}")
            }
        }
    }
}

fn emit_array<T: fmt::Display>(out: &mut String, name: &str, ty: &str, values: &[T]) -> fmt::Result {
    writeln!(out, "static {name}: [{ty}; {}] = [", values.len())?;
    for line in values.chunks(VALUES_PER_LINE) {
        write!(out, "   ")?;
        for value in line {
            write!(out, " {value},")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "];")
}

/// A byte-string literal for `bytes`, escaped so any byte value survives.
fn byte_string(bytes: &[u8]) -> String {
    let mut literal = String::with_capacity(bytes.len() + 3);
    literal.push_str("b\"");
    for &byte in bytes {
        for escaped in std::ascii::escape_default(byte) {
            literal.push(escaped as char);
        }
    }
    literal.push('"');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyMapConfig;
    use crate::planner::strategy::StrategyTag;

    fn map(names: &[&str]) -> KeyMap {
        KeyMap::from_names(names, &KeyMapConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_bad_identifier() {
        let m = map(&["a", "bb"]);
        assert!(emit(&m, &CodegenOptions::new("")).is_err());
        assert!(emit(&m, &CodegenOptions::new("9lives")).is_err());
        assert!(emit(&m, &CodegenOptions::new("has-dash")).is_err());
        assert!(emit(&m, &CodegenOptions::new("_ok_9")).is_ok());
    }

    #[test]
    fn test_single_byte_source() {
        let m = map(&["a", "bb"]);
        let source = emit(&m, &CodegenOptions::new("pair")).unwrap();
        assert!(source.contains("// strategy: single_byte | keys: 2"));
        assert!(source.contains("pub const PAIR_KEY_COUNT: usize = 2;"));
        assert!(source.contains(r#"pub static PAIR_KEYS: [&[u8]; 2] = [b"a", b"bb"];"#));
        assert!(source.contains("static PAIR_SLOTS: [u16; 256] = ["));
        assert!(source.contains("pub fn pair_resolve(input: &[u8]) -> usize {"));
        assert!(source.contains("Some(&byte) => PAIR_SLOTS[byte as usize] as usize,"));
        // Column layouts never scan for the key end.
        assert!(!source.contains("PAIR_WINDOW"));
        assert!(source.contains("pub fn pair_find(input: &[u8]) -> Option<usize> {"));
        // No dispatch on the layout in the emitted body.
        assert!(!source.contains("Tables::"));
    }

    #[test]
    fn test_double_element_embeds_expected_bytes() {
        let m = map(&["bx", "ay"]);
        assert_eq!(m.strategy().tag(), StrategyTag::DoubleElement);
        let source = emit(&m, &CodegenOptions::new("d")).unwrap();
        assert!(source.contains(&format!("[{}u8, {}u8][candidate]", b'b', b'a')));
    }

    #[test]
    fn test_simd_source_pins_hash_at_compile_time() {
        let m = map(&["xab", "xba", "xaa"]);
        let Tables::SimdFullLength(table) = m.resolver().tables() else {
            panic!("expected the simd layout");
        };
        let source = emit(&m, &CodegenOptions::new("hard").with_crate_path("crate")).unwrap();
        let expected = table.hasher.hash_prefix(b"xab", table.prefix_len);
        assert!(source.contains(&format!(
            "const HARD_HASHER: crate::kernels::KeyHasher = crate::kernels::KeyHasher::new({:#x});",
            table.hasher.seed()
        )));
        assert!(source.contains(&format!(
            "const _: () = assert!(HARD_HASHER.hash_prefix(b\"xab\", 3) == {:#x});",
            expected
        )));
        assert!(source.contains("crate::kernels::first_match(&HARD_CONTROL[base..base + "));
        assert!(source.contains("const HARD_WINDOW: crate::kernels::LengthWindow"));
    }

    #[test]
    fn test_length_layouts_emit_window() {
        let m = map(&["a", "ab", "ba"]);
        assert_eq!(m.strategy().tag(), StrategyTag::UniquePerLength);
        let source = emit(&m, &CodegenOptions::new("len")).unwrap();
        assert!(source.contains(
            "const LEN_WINDOW: ::perfkey::kernels::LengthWindow = ::perfkey::kernels::LengthWindow::new(1, 2, 34);"
        ));
        assert!(source.contains("static LEN_COLUMNS: [u8; 3] = ["));
        assert!(source.contains("static LEN_SLOTS: [u16; 768] = ["));
    }

    #[test]
    fn test_empty_map_source() {
        let m = map(&[]);
        let source = emit(&m, &CodegenOptions::new("none")).unwrap();
        assert!(source.contains("pub static NONE_KEYS: [&[u8]; 0] = [];"));
        assert!(source.contains("    NONE_KEY_COUNT\n"));
    }

    #[test]
    fn test_byte_string_escapes() {
        assert_eq!(byte_string(b"plain"), r#"b"plain""#);
        assert_eq!(byte_string(b"q\"\\"), r#"b"q\"\\""#);
        assert_eq!(byte_string(&[0x00, 0xFF]), r#"b"\x00\xff""#);
    }
}
