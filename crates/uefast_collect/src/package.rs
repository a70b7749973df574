//! Package summary reader.
//!
//! Only the parts of a package header needed for dependency extraction are
//! decoded: the name table, the import table, and the soft package reference
//! list. Every offset and count is bounds-checked against the file; anything
//! inconsistent is a [`PackageError`] and the asset is skipped by the caller.

use std::collections::HashMap;

/// Magic number at the start of every package file.
pub const PACKAGE_MAGIC: u32 = 0x9E2A_83C1;

/// Legacy file version written by current engine releases.
const LEGACY_FILE_VERSION: i32 = -8;

/// Size of one custom-version record (GUID + version).
const CUSTOM_VERSION_SIZE: usize = 20;

/// Size of one import-table entry.
const IMPORT_ENTRY_SIZE: usize = 28;

/// Size of a serialized name reference (index + number).
const FNAME_SIZE: usize = 8;

/// Class name marking an import as a whole package.
const PACKAGE_CLASS: &str = "Package";

/// Class package written for package imports.
const CORE_UOBJECT: &str = "/Script/CoreUObject";

/// Reasons a package summary is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageError {
    /// The file does not start with [`PACKAGE_MAGIC`].
    #[error("bad package magic {0:#010x}")]
    BadMagic(u32),

    /// The legacy version field is not a (negative) modern version.
    #[error("unsupported legacy file version {0}")]
    UnsupportedLegacyVersion(i32),

    /// A read ran past the end of the file.
    #[error("truncated at offset {offset}: needed {needed} more bytes")]
    Truncated {
        /// Where the read started.
        offset: usize,
        /// How many bytes it needed.
        needed: usize,
    },

    /// A count field is negative or larger than the file could hold.
    #[error("invalid {field} count {value}")]
    InvalidCount {
        /// Which table the count belongs to.
        field: &'static str,
        /// The value found.
        value: i32,
    },

    /// An offset field points outside the file.
    #[error("invalid {field} offset {value}")]
    InvalidOffset {
        /// Which table the offset belongs to.
        field: &'static str,
        /// The value found.
        value: i32,
    },

    /// A name reference points outside the name table.
    #[error("name index {0} out of range")]
    InvalidNameIndex(i32),

    /// A string has an impossible length or is not valid text.
    #[error("invalid string at offset {0}")]
    InvalidString(usize),
}

/// One entry of the import table, with names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Package that defines the imported object's class.
    pub class_package: String,
    /// Class of the imported object.
    pub class_name: String,
    /// Import index of the outer object; 0 for top-level imports.
    pub outer_index: i32,
    /// Name of the imported object.
    pub object_name: String,
}

impl ImportEntry {
    /// Returns the package name if this import references a whole package.
    pub fn package_reference(&self) -> Option<&str> {
        (self.class_name == PACKAGE_CLASS && self.outer_index == 0)
            .then_some(self.object_name.as_str())
    }
}

/// The decoded reference table of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    /// Package name recorded in the header.
    pub package_name: String,
    /// UE4 object version.
    pub file_version_ue4: i32,
    /// UE5 object version.
    pub file_version_ue5: i32,
    /// Package flags.
    pub package_flags: u32,
    /// Import table.
    pub imports: Vec<ImportEntry>,
    /// Soft package references.
    pub soft_references: Vec<String>,
}

/// Package names referenced by a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReferences {
    /// Packages imported directly (hard references).
    pub hard: Vec<String>,
    /// Packages referenced softly.
    pub soft: Vec<String>,
}

impl PackageSummary {
    /// Creates an empty summary for the named package.
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            file_version_ue4: 522,
            file_version_ue5: 1009,
            package_flags: 0,
            imports: Vec::new(),
            soft_references: Vec::new(),
        }
    }

    /// Adds a top-level package import (a hard reference).
    pub fn with_import(mut self, package: impl Into<String>) -> Self {
        self.imports.push(ImportEntry {
            class_package: CORE_UOBJECT.to_string(),
            class_name: PACKAGE_CLASS.to_string(),
            outer_index: 0,
            object_name: package.into(),
        });
        self
    }

    /// Adds a soft package reference.
    pub fn with_soft_reference(mut self, package: impl Into<String>) -> Self {
        self.soft_references.push(package.into());
        self
    }

    /// Returns the hard and soft package references, in table order.
    pub fn references(&self) -> PackageReferences {
        PackageReferences {
            hard: self
                .imports
                .iter()
                .filter_map(ImportEntry::package_reference)
                .map(str::to_string)
                .collect(),
            soft: self.soft_references.clone(),
        }
    }

    /// Decodes a package summary from the start of a package file.
    pub fn parse(data: &[u8]) -> Result<Self, PackageError> {
        let mut r = Reader::new(data, 0);

        let magic = r.u32()?;
        if magic != PACKAGE_MAGIC {
            return Err(PackageError::BadMagic(magic));
        }
        let legacy_version = r.i32()?;
        if legacy_version >= 0 {
            return Err(PackageError::UnsupportedLegacyVersion(legacy_version));
        }
        let _legacy_ue3_version = r.i32()?;
        let file_version_ue4 = r.i32()?;
        let file_version_ue5 = r.i32()?;
        let _licensee_version = r.i32()?;

        let custom_versions = count(r.i32()?, "custom version", CUSTOM_VERSION_SIZE, data.len())?;
        r.skip(custom_versions * CUSTOM_VERSION_SIZE)?;

        let total_header_size = r.i32()?;
        if total_header_size < 0 || total_header_size as usize > data.len() {
            return Err(PackageError::InvalidOffset {
                field: "total header size",
                value: total_header_size,
            });
        }

        let package_name = r.fstring()?;
        let package_flags = r.u32()?;

        let name_count = r.i32()?;
        let name_offset = r.i32()?;
        let _export_count = r.i32()?;
        let _export_offset = r.i32()?;
        let import_count = r.i32()?;
        let import_offset = r.i32()?;
        let soft_count = r.i32()?;
        let soft_offset = r.i32()?;

        // Each name needs at least a length and a hash.
        let mut names_reader = table(data, "name", name_count, name_offset, 8)?;
        let name_count = name_count as usize;
        let mut names = Vec::with_capacity(name_count);
        for _ in 0..name_count {
            names.push(names_reader.fstring()?);
            let _hash = names_reader.u32()?;
        }

        let mut import_reader = table(data, "import", import_count, import_offset, IMPORT_ENTRY_SIZE)?;
        let mut imports = Vec::with_capacity(import_count as usize);
        for _ in 0..import_count {
            let class_package = resolve_name(&names, import_reader.fname()?)?;
            let class_name = resolve_name(&names, import_reader.fname()?)?;
            let outer_index = import_reader.i32()?;
            let object_name = resolve_name(&names, import_reader.fname()?)?;
            imports.push(ImportEntry {
                class_package,
                class_name,
                outer_index,
                object_name,
            });
        }

        let mut soft_reader = table(data, "soft package reference", soft_count, soft_offset, FNAME_SIZE)?;
        let mut soft_references = Vec::with_capacity(soft_count as usize);
        for _ in 0..soft_count {
            soft_references.push(resolve_name(&names, soft_reader.fname()?)?);
        }

        Ok(Self {
            package_name,
            file_version_ue4,
            file_version_ue5,
            package_flags,
            imports,
            soft_references,
        })
    }

    /// Encodes this summary in the layout [`parse`](Self::parse) reads.
    ///
    /// Produces a self-contained package header with no exports, suitable
    /// for fixtures and tooling.
    pub fn encode(&self) -> Vec<u8> {
        let mut names = NameTable::default();
        let import_refs: Vec<_> = self
            .imports
            .iter()
            .map(|import| {
                (
                    names.intern(&import.class_package),
                    names.intern(&import.class_name),
                    import.outer_index,
                    names.intern(&import.object_name),
                )
            })
            .collect();
        let soft_refs: Vec<i32> = self
            .soft_references
            .iter()
            .map(|s| names.intern(s))
            .collect();

        let header_len = encode_header(self, &TableOffsets::default()).len();
        let mut name_table = Vec::new();
        for name in &names.entries {
            put_fstring(&mut name_table, name);
            put_u32(&mut name_table, 0);
        }

        let name_offset = header_len;
        let import_offset = name_offset + name_table.len();
        let soft_offset = import_offset + import_refs.len() * IMPORT_ENTRY_SIZE;
        let end = soft_offset + soft_refs.len() * FNAME_SIZE;

        let offsets = TableOffsets {
            total_header_size: end as i32,
            name_count: names.entries.len() as i32,
            name_offset: name_offset as i32,
            import_count: import_refs.len() as i32,
            import_offset: import_offset as i32,
            soft_count: soft_refs.len() as i32,
            soft_offset: soft_offset as i32,
        };

        let mut out = encode_header(self, &offsets);
        out.extend_from_slice(&name_table);
        for (class_package, class_name, outer_index, object_name) in import_refs {
            put_fname(&mut out, class_package);
            put_fname(&mut out, class_name);
            put_i32(&mut out, outer_index);
            put_fname(&mut out, object_name);
        }
        for name in soft_refs {
            put_fname(&mut out, name);
        }
        out
    }
}

/// Name table under construction; names are interned in first-use order.
#[derive(Default)]
struct NameTable<'a> {
    entries: Vec<&'a str>,
    index: HashMap<&'a str, i32>,
}

impl<'a> NameTable<'a> {
    fn intern(&mut self, name: &'a str) -> i32 {
        let entries = &mut self.entries;
        *self.index.entry(name).or_insert_with(|| {
            entries.push(name);
            entries.len() as i32 - 1
        })
    }
}

#[derive(Default)]
struct TableOffsets {
    total_header_size: i32,
    name_count: i32,
    name_offset: i32,
    import_count: i32,
    import_offset: i32,
    soft_count: i32,
    soft_offset: i32,
}

fn encode_header(summary: &PackageSummary, offsets: &TableOffsets) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, PACKAGE_MAGIC);
    put_i32(&mut out, LEGACY_FILE_VERSION);
    put_i32(&mut out, 864);
    put_i32(&mut out, summary.file_version_ue4);
    put_i32(&mut out, summary.file_version_ue5);
    put_i32(&mut out, 0);
    put_i32(&mut out, 0); // no custom versions
    put_i32(&mut out, offsets.total_header_size);
    put_fstring(&mut out, &summary.package_name);
    put_u32(&mut out, summary.package_flags);
    put_i32(&mut out, offsets.name_count);
    put_i32(&mut out, offsets.name_offset);
    put_i32(&mut out, 0);
    put_i32(&mut out, 0);
    put_i32(&mut out, offsets.import_count);
    put_i32(&mut out, offsets.import_offset);
    put_i32(&mut out, offsets.soft_count);
    put_i32(&mut out, offsets.soft_offset);
    out
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_fname(out: &mut Vec<u8>, index: i32) {
    put_i32(out, index);
    put_i32(out, 0);
}

fn put_fstring(out: &mut Vec<u8>, s: &str) {
    if s.is_empty() {
        put_i32(out, 0);
        return;
    }
    put_i32(out, s.len() as i32 + 1);
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// Validates a count read from the header against the bytes available.
fn count(value: i32, field: &'static str, entry_size: usize, available: usize) -> Result<usize, PackageError> {
    if value < 0 || (value as usize).saturating_mul(entry_size) > available {
        return Err(PackageError::InvalidCount { field, value });
    }
    Ok(value as usize)
}

/// Positions a reader at a table, checking that the table can fit.
fn table<'a>(
    data: &'a [u8],
    field: &'static str,
    count_value: i32,
    offset: i32,
    entry_size: usize,
) -> Result<Reader<'a>, PackageError> {
    let entries = count(count_value, field, entry_size, data.len())?;
    if entries == 0 {
        return Ok(Reader::new(data, data.len()));
    }
    if offset < 0 || offset as usize + entries * entry_size > data.len() {
        return Err(PackageError::InvalidOffset { field, value: offset });
    }
    Ok(Reader::new(data, offset as usize))
}

fn resolve_name(names: &[String], (index, number): (i32, i32)) -> Result<String, PackageError> {
    let base = usize::try_from(index)
        .ok()
        .and_then(|i| names.get(i))
        .ok_or(PackageError::InvalidNameIndex(index))?;
    if number > 0 {
        Ok(format!("{base}_{}", number - 1))
    } else {
        Ok(base.clone())
    }
}

/// Bounds-checked little-endian cursor over package bytes.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PackageError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(PackageError::Truncated {
                offset: self.pos,
                needed: n,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<(), PackageError> {
        self.take(n).map(|_| ())
    }

    fn u32(&mut self) -> Result<u32, PackageError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32, PackageError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn fname(&mut self) -> Result<(i32, i32), PackageError> {
        Ok((self.i32()?, self.i32()?))
    }

    /// Reads a length-prefixed string: positive lengths are NUL-terminated
    /// single-byte text, negative lengths are NUL-terminated UTF-16 units.
    fn fstring(&mut self) -> Result<String, PackageError> {
        let start = self.pos;
        let len = self.i32()?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > 0 {
            let bytes = self.take(len as usize)?;
            let (last, text) = bytes.split_last().ok_or(PackageError::InvalidString(start))?;
            if *last != 0 {
                return Err(PackageError::InvalidString(start));
            }
            return String::from_utf8(text.to_vec()).map_err(|_| PackageError::InvalidString(start));
        }
        let units = len.checked_neg().ok_or(PackageError::InvalidString(start))? as usize;
        let bytes = self.take(units.checked_mul(2).ok_or(PackageError::InvalidString(start))?)?;
        let mut utf16: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        if utf16.pop() != Some(0) {
            return Err(PackageError::InvalidString(start));
        }
        String::from_utf16(&utf16).map_err(|_| PackageError::InvalidString(start))
    }
}
