// In: codegen-check/build.rs

//! Emits one resolver source file per entry of `LAYOUTS` into `OUT_DIR`.

#[path = "src/layouts.rs"]
#[allow(dead_code)]
mod layouts;

use std::env;
use std::fs;
use std::path::PathBuf;

use perfkey::bridge::{emit, CodegenOptions};
use perfkey::KeyMap;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/layouts.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    for layout in layouts::LAYOUTS {
        let map = KeyMap::from_names(layout.keys, &layout.config())?;
        let chosen = map.strategy().tag();
        if chosen != layout.tag {
            return Err(format!(
                "layout '{}' expected strategy '{}' but the cascade chose '{}'",
                layout.name, layout.tag, chosen
            )
            .into());
        }
        let source = emit(&map, &CodegenOptions::new(layout.name))?;
        fs::write(out_dir.join(format!("{}.rs", layout.name)), source)?;
    }
    Ok(())
}
