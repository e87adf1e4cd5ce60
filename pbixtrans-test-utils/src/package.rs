//! In-memory package fixtures

use pbixtrans_format::constants::{LAYOUT_MEMBER, SECURITY_BINDINGS_MEMBER};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Encode a layout value the way Power BI stores it (UTF-16LE compact JSON)
pub fn layout_bytes(layout: &Value) -> Vec<u8> {
    pbixtrans_format::encode_layout(layout).expect("layout should serialize")
}

/// Write a ZIP package with the given members, in order
pub fn write_package(path: &Path, members: &[(&str, Vec<u8>)]) {
    let file = File::create(path).expect("create package");
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in members {
        writer.start_file(*name, options).expect("start member");
        writer.write_all(bytes).expect("write member");
    }
    writer.finish().expect("finish package");
}

/// Read every file member of a ZIP package, keyed by member name
pub fn read_package(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = File::open(path).expect("open package");
    let mut archive = ZipArchive::new(file).expect("read package");
    let mut members = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("read member");
        if entry.is_dir() {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).expect("read member bytes");
        members.insert(entry.name().to_string(), bytes);
    }
    members
}

/// Members of a typical package around `layout`
pub fn sample_members(layout: &Value) -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("Version", "1.28".encode_utf16().flat_map(u16::to_le_bytes).collect()),
        ("[Content_Types].xml", b"<?xml version=\"1.0\" encoding=\"utf-8\"?><Types/>".to_vec()),
        ("DataModel", (0u8..=255).cycle().take(4096).collect()),
        (LAYOUT_MEMBER, layout_bytes(layout)),
        ("Report/StaticResources/SharedResources/BaseThemes/CY23SU04.json", b"{\"name\":\"CY23SU04\"}".to_vec()),
        (SECURITY_BINDINGS_MEMBER, vec![0xde, 0xad, 0xbe, 0xef]),
        ("Metadata", vec![1, 0, 0, 0]),
    ]
}

/// Write a typical package around `layout`, including `SecurityBindings`
pub fn sample_package(path: &Path, layout: &Value) {
    write_package(path, &sample_members(layout));
}
