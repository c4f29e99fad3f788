//! Shared helpers for OOXML containers (docx/pptx): archive access, core
//! properties, relationship parts, and unit conversions.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub type Archive = zip::ZipArchive<File>;

/// EMUs per inch (OOXML drawing unit).
const EMU_PER_INCH: f64 = 914_400.0;
/// Twentieths of a point per inch (WordprocessingML page unit).
const TWIPS_PER_INCH: f64 = 1_440.0;

pub fn open_archive(path: &Path) -> Result<Archive, String> {
    let file = File::open(path)
        .map_err(|error| format!("failed to open '{}': {error}", path.display()))?;
    zip::ZipArchive::new(file)
        .map_err(|error| format!("failed to read container '{}': {error}", path.display()))
}

/// Read one archive part as UTF-8 text.
pub fn read_part(archive: &mut Archive, name: &str) -> Result<String, String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|error| format!("part not found in container '{name}': {error}"))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|error| format!("failed to read part '{name}': {error}"))?;
    Ok(content)
}

/// Read one archive part as raw bytes (media payloads).
pub fn read_part_bytes(archive: &mut Archive, name: &str) -> Result<Vec<u8>, String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|error| format!("part not found in container '{name}': {error}"))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|error| format!("failed to read part '{name}': {error}"))?;
    Ok(bytes)
}

pub fn has_part(archive: &mut Archive, name: &str) -> bool {
    archive.by_name(name).is_ok()
}

/// One entry of a `.rels` relationship part.
#[derive(Debug, Clone)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Parse a relationship part. Missing parts yield an empty list since many
/// documents simply have no relationships of interest.
pub fn relationships(archive: &mut Archive, part: &str) -> Result<Vec<Relationship>, String> {
    if !has_part(archive, part) {
        return Ok(Vec::new());
    }
    let content = read_part(archive, part)?;

    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref element)) | Ok(Event::Start(ref element))
                if element.name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut rel_type = String::new();
                let mut target = String::new();
                for attribute in element.attributes().flatten() {
                    match attribute.key.as_ref() {
                        b"Id" => id = String::from_utf8_lossy(&attribute.value).to_string(),
                        b"Type" => rel_type = String::from_utf8_lossy(&attribute.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attribute.value).to_string(),
                        _ => {}
                    }
                }
                relationships.push(Relationship {
                    id,
                    rel_type,
                    target,
                });
            }
            Ok(Event::Eof) => break,
            Err(error) => return Err(format!("error parsing relationships '{part}': {error}")),
            _ => {}
        }
    }

    Ok(relationships)
}

/// Resolve a relationship target against the directory of its source part.
/// Handles leading `/` (package-absolute) and `../` segments.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_owned();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Core properties from `docProps/core.xml`, keyed the way the normalized
/// metadata expects them. A missing part yields an empty map.
pub fn core_properties(archive: &mut Archive) -> Result<BTreeMap<String, String>, String> {
    if !has_part(archive, "docProps/core.xml") {
        return Ok(BTreeMap::new());
    }
    let content = read_part(archive, "docProps/core.xml")?;

    let mut properties = BTreeMap::new();
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    let mut current_key: Option<&'static str> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref element)) => {
                current_key = property_key(element.name().as_ref());
            }
            Ok(Event::Text(ref text)) => {
                if let Some(key) = current_key {
                    let value = text.unescape().unwrap_or_default().trim().to_string();
                    if !value.is_empty() {
                        properties.insert(key.to_owned(), value);
                    }
                }
            }
            Ok(Event::End(_)) => current_key = None,
            Ok(Event::Eof) => break,
            Err(error) => return Err(format!("error parsing core properties: {error}")),
            _ => {}
        }
    }

    Ok(properties)
}

fn property_key(qualified: &[u8]) -> Option<&'static str> {
    match qualified {
        b"dc:creator" => Some("author"),
        b"dc:title" => Some("title"),
        b"dc:subject" => Some("subject"),
        b"dc:description" => Some("comments"),
        b"dc:identifier" => Some("identifier"),
        b"dc:language" => Some("language"),
        b"cp:keywords" => Some("keywords"),
        b"cp:category" => Some("category"),
        b"cp:contentStatus" => Some("content_status"),
        b"cp:lastModifiedBy" => Some("last_modified_by"),
        b"cp:lastPrinted" => Some("last_printed"),
        b"cp:revision" => Some("revision"),
        b"cp:version" => Some("version"),
        b"dcterms:created" => Some("created"),
        b"dcterms:modified" => Some("modified"),
        _ => None,
    }
}

/// Strip an XML namespace prefix: `w:p` -> `p`.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(position) = name.iter().position(|&byte| byte == b':') {
        &name[position + 1..]
    } else {
        name
    }
}

pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH
}

pub fn twips_to_inches(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_INCH
}

/// Attribute value by local name, if present.
pub fn attribute_value(
    element: &quick_xml::events::BytesStart<'_>,
    name: &[u8],
) -> Option<String> {
    for attribute in element.attributes().flatten() {
        if local_name(attribute.key.as_ref()) == name {
            return Some(String::from_utf8_lossy(&attribute.value).to_string());
        }
    }
    None
}

/// MIME type for a media file extension inside the container.
pub fn media_content_type(name: &str) -> Option<&'static str> {
    let extension = name.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tiff" | "tif" => Some("image/tiff"),
        "emf" => Some("image/x-emf"),
        "wmf" => Some("image/x-wmf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_targets() {
        assert_eq!(
            resolve_target("ppt/slides", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            resolve_target("ppt/slides", "slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            resolve_target("ppt/_rels", "/ppt/slides/slide2.xml"),
            "ppt/slides/slide2.xml"
        );
    }

    #[test]
    fn strips_namespace_prefixes() {
        assert_eq!(local_name(b"w:p"), b"p");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"p"), b"p");
    }

    #[test]
    fn converts_ooxml_units_to_inches() {
        assert_eq!(emu_to_inches(914_400), 1.0);
        assert_eq!(twips_to_inches(720), 0.5);
    }

    #[test]
    fn maps_media_extensions_to_mime_types() {
        assert_eq!(media_content_type("media/image1.png"), Some("image/png"));
        assert_eq!(media_content_type("media/photo.JPG"), Some("image/jpeg"));
        assert_eq!(media_content_type("media/unknown.xyz"), None);
    }
}
