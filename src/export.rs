use std::path::Path;

use itertools::Itertools;

use crate::common::ENCODED_TILE_LEN;

/// Array name derived from a file path: lower-cased stem with dashes and
/// spaces replaced by underscores.
pub fn array_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
        .replace(['-', ' '], "_")
}

fn hex_rows(data: &[u8], per_row: usize) -> String {
    data.chunks(per_row.max(1))
        .map(|row| format!("  {}", row.iter().map(|b| format!("0x{:02X}", b)).join(",")))
        .join(",\n")
}

fn byte_array(decl: &str, data: &[u8], per_row: usize) -> String {
    format!("unsigned char {decl}[] = \n{{\n{}\n}};\n", hex_rows(data, per_row))
}

pub fn tile_data_source(name: &str, tile_data: &[u8]) -> String {
    let ntiles = tile_data.len() / ENCODED_TILE_LEN;
    format!(
        "/*\nNumber of tiles: {ntiles}\n*/\n\n{}",
        byte_array(&format!("{name}_tiles"), tile_data, ENCODED_TILE_LEN)
    )
}

pub fn map_source(name: &str, map: &[u8], stride: usize, ntiles: usize) -> String {
    let rows = if stride == 0 { 0 } else { map.len() / stride };
    format!(
        "/*\nTile map size: {stride}x{rows}\n*/\n\nshort {name}_ntiles = {ntiles};\n{}",
        byte_array(&format!("{name}_map"), map, stride)
    )
}

pub fn sprite_source(name: &str, tile_data: &[u8]) -> String {
    byte_array(&format!("{name}_data"), tile_data, ENCODED_TILE_LEN)
}

pub fn colliders_source(name: &str, flags: &[u8], stride: usize) -> String {
    byte_array(&format!("{name}_colliders"), flags, stride)
}

/// Matching `extern` declaration for a generated array.
pub fn declaration(source: &str) -> Option<String> {
    source
        .lines()
        .find(|line| line.starts_with("unsigned char ") || line.starts_with("short "))
        .map(|line| {
            let decl = line.trim_end().trim_end_matches('=').trim_end();
            let decl = decl.split(" = ").next().unwrap_or(decl);
            format!("extern {};", decl.trim_end_matches(';'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_from_paths() {
        assert_eq!(array_name(Path::new("assets/Level-4 Map.png")), "level_4_map");
        assert_eq!(array_name(Path::new("cube_sprite.png")), "cube_sprite");
    }

    #[test]
    fn tile_table_layout() {
        let mut data = vec![0xFF; 16];
        data.extend([0x0A; 16]);
        let src = tile_data_source("bkg", &data);
        assert!(src.starts_with("/*\nNumber of tiles: 2\n*/\n\nunsigned char bkg_tiles[] = \n{\n"));
        let lines: Vec<&str> = src.lines().collect();
        assert_eq!(lines[6], format!("  {},", vec!["0xFF"; 16].join(",")));
        assert_eq!(lines[7], format!("  {}", vec!["0x0A"; 16].join(",")));
        assert_eq!(lines[8], "};");
    }

    #[test]
    fn map_table_layout() {
        let src = map_source("bkg", &[0x25, 0x26, 0x25, 0x27], 2, 3);
        assert_eq!(
            src,
            "/*\nTile map size: 2x2\n*/\n\nshort bkg_ntiles = 3;\n\
             unsigned char bkg_map[] = \n{\n  0x25,0x26,\n  0x25,0x27\n};\n"
        );
    }

    #[test]
    fn colliders_layout() {
        let src = colliders_source("level4", &[0, 1, 1, 0], 2);
        assert_eq!(
            src,
            "unsigned char level4_colliders[] = \n{\n  0x00,0x01,\n  0x01,0x00\n};\n"
        );
    }

    #[test]
    fn extern_declarations() {
        let src = map_source("bkg", &[0], 1, 1);
        assert_eq!(declaration(&src).as_deref(), Some("extern short bkg_ntiles;"));
        let src = sprite_source("cube", &[0; 16]);
        assert_eq!(
            declaration(&src).as_deref(),
            Some("extern unsigned char cube_data[];")
        );
    }
}
