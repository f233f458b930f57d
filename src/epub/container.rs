/*!
 * EPUB container handling.
 *
 * The whole package is held in memory: every ZIP entry keeps its name, bytes
 * and compression so that an untouched package is written back entry for
 * entry. The `mimetype` entry is always written first and stored.
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use log::{debug, warn};
use percent_encoding::percent_decode_str;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::EpubError;

use super::opf::{self, ManifestItem, Metadata, MetadataUpdate, PackageDocument};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const MIMETYPE_PATH: &str = "mimetype";
const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";

/// One file or directory of the ZIP container
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Path inside the archive
    pub name: String,
    /// File contents (empty for directories)
    pub data: Vec<u8>,
    /// Whether the entry was stored without compression
    pub stored: bool,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// An EPUB package loaded into memory
#[derive(Debug, Clone)]
pub struct EpubPackage {
    entries: Vec<PackageEntry>,
    opf_path: String,
    package: PackageDocument,
}

impl EpubPackage {
    /// Open an EPUB file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EpubError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read an EPUB from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, EpubError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
            });
        }

        let container = entries
            .iter()
            .find(|entry| entry.name == CONTAINER_PATH)
            .ok_or_else(|| EpubError::MissingEntry(CONTAINER_PATH.to_string()))?;
        let opf_path = opf::parse_container_xml(&container.data)?;

        let mut package = Self {
            entries,
            opf_path,
            package: PackageDocument::default(),
        };
        package.reload_package()?;

        debug!(
            "Opened EPUB package: {} entries, {} manifest items, OPF at {}",
            package.entries.len(),
            package.package.manifest.len(),
            package.opf_path
        );

        Ok(package)
    }

    fn reload_package(&mut self) -> Result<(), EpubError> {
        let opf = self.opf_text()?;
        self.package = opf::parse_package(&self.opf_path, &opf)?;
        Ok(())
    }

    fn opf_text(&self) -> Result<String, EpubError> {
        let data = self
            .entry(&self.opf_path)
            .ok_or_else(|| EpubError::MissingEntry(self.opf_path.clone()))?;
        String::from_utf8(super::markup::strip_bom(data).to_vec())
            .map_err(|e| EpubError::InvalidPackage(format!("{} is not UTF-8: {}", self.opf_path, e)))
    }

    /// Path of the OPF package document
    pub fn opf_path(&self) -> &str {
        &self.opf_path
    }

    /// Manifest items in document order
    pub fn manifest(&self) -> &[ManifestItem] {
        &self.package.manifest
    }

    /// Archive paths of the content documents, in manifest order.
    ///
    /// Manifest items pointing at missing entries are skipped with a warning.
    pub fn documents(&self) -> Vec<String> {
        let opf_dir = match self.opf_path.rfind('/') {
            Some(index) => &self.opf_path[..index],
            None => "",
        };

        self.package
            .manifest
            .iter()
            .filter(|item| item.is_content_document())
            .filter_map(|item| {
                let path = resolve_href(opf_dir, &item.href);
                if self.entry(&path).is_some() {
                    Some(path)
                } else {
                    warn!("Manifest item '{}' points at missing entry {}", item.id, path);
                    None
                }
            })
            .collect()
    }

    /// All entries in archive order
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Contents of an entry
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name && !entry.is_dir)
            .map(|entry| entry.data.as_slice())
    }

    /// Replace the contents of an existing entry
    pub fn replace_entry(&mut self, name: &str, data: Vec<u8>) -> Result<(), EpubError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name && !entry.is_dir)
            .ok_or_else(|| EpubError::MissingEntry(name.to_string()))?;
        entry.data = data;
        Ok(())
    }

    /// Title, identifier and language from the OPF
    pub fn metadata(&self) -> &Metadata {
        &self.package.metadata
    }

    /// Rewrite the OPF metadata fields named in `update`
    pub fn update_metadata(&mut self, update: &MetadataUpdate) -> Result<(), EpubError> {
        let opf = self.opf_text()?;
        let rewritten = opf::rewrite_metadata(&self.opf_path, &opf, update)?;
        let opf_path = self.opf_path.clone();
        self.replace_entry(&opf_path, rewritten.into_bytes())?;
        self.reload_package()
    }

    /// Write the package as a ZIP archive
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), EpubError> {
        let mut zip = ZipWriter::new(writer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        // mimetype must be the first entry and uncompressed
        let mimetype = self.entry(MIMETYPE_PATH).unwrap_or(EPUB_MIMETYPE);
        zip.start_file(MIMETYPE_PATH, stored)?;
        zip.write_all(mimetype)?;

        for entry in self.entries.iter().filter(|entry| entry.name != MIMETYPE_PATH) {
            let options = if entry.stored { stored } else { deflated };
            if entry.is_dir {
                zip.add_directory(entry.name.trim_end_matches('/'), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize the package into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>, EpubError> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EpubError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Resolve a manifest href against the OPF directory
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let decoded = percent_decode_str(href).decode_utf8_lossy();

    let mut parts: Vec<&str> = base_dir.split('/').filter(|part| !part.is_empty()).collect();
    for part in decoded.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
