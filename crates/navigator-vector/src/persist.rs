//! On-disk layout of a store: `<prefix>.index` + `<prefix>.json`.
//!
//! The index file is little-endian:
//!
//! ```text
//! magic        8 bytes  b"NAVFLAT\0"
//! version      u32      FORMAT_VERSION
//! dimension    u32
//! count        u64      number of rows
//! texts_digest u64      xxHash64 of the companion JSON file's bytes
//! rows         count * dimension * f32
//! ```
//!
//! Both files are written to temporaries in the target directory and then
//! renamed, JSON first. The digest ties the pair together so a crash between
//! the two renames is detected on load instead of silently mixing versions.

use std::ffi::OsString;
use std::fs;
use std::hash::Hasher;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use twox_hash::XxHash64;

use crate::error::{Result, StoreError};
use crate::index::FlatL2Index;

pub const INDEX_EXTENSION: &str = "index";
pub const TEXTS_EXTENSION: &str = "json";

const MAGIC: &[u8; 8] = b"NAVFLAT\0";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8 + 4 + 4 + 8 + 8;

pub fn index_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, INDEX_EXTENSION)
}

pub fn texts_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, TEXTS_EXTENSION)
}

// `Path::with_extension` would eat a dotted prefix such as `store.v2`.
fn with_suffix(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = OsString::from(prefix.as_os_str());
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::PersistenceIo { path: path.to_path_buf(), source }
}

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

pub(crate) fn save_pair(prefix: &Path, index: &FlatL2Index, texts: &[String]) -> Result<()> {
    let index_file = index_path(prefix);
    let texts_file = texts_path(prefix);
    let dir = match prefix.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err(&dir))?;

    let json = serde_json::to_vec_pretty(texts)
        .map_err(|source| StoreError::Json { path: texts_file.clone(), source })?;

    let mut json_tmp = NamedTempFile::new_in(&dir).map_err(io_err(&dir))?;
    json_tmp.write_all(&json).map_err(io_err(&texts_file))?;
    json_tmp.as_file().sync_all().map_err(io_err(&texts_file))?;

    let mut index_tmp = NamedTempFile::new_in(&dir).map_err(io_err(&dir))?;
    {
        let mut w = BufWriter::new(index_tmp.as_file_mut());
        write_index(&mut w, index, digest(&json)).map_err(io_err(&index_file))?;
        w.flush().map_err(io_err(&index_file))?;
    }
    index_tmp.as_file().sync_all().map_err(io_err(&index_file))?;

    json_tmp.persist(&texts_file).map_err(|e| io_err(&texts_file)(e.error))?;
    index_tmp.persist(&index_file).map_err(|e| io_err(&index_file)(e.error))?;
    Ok(())
}

fn write_index<W: Write>(w: &mut W, index: &FlatL2Index, texts_digest: u64) -> std::io::Result<()> {
    let dim = u32::try_from(index.dim())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "dimension exceeds u32"))?;
    w.write_all(MAGIC)?;
    w.write_all(&FORMAT_VERSION.to_le_bytes())?;
    w.write_all(&dim.to_le_bytes())?;
    w.write_all(&(index.len() as u64).to_le_bytes())?;
    w.write_all(&texts_digest.to_le_bytes())?;
    for value in index.raw() {
        w.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Read both companion files and check that they belong together.
pub(crate) fn load_pair(prefix: &Path) -> Result<(FlatL2Index, Vec<String>)> {
    let index_file = index_path(prefix);
    let texts_file = texts_path(prefix);

    let (index, expected_digest) = read_index(&index_file)?;
    let json = fs::read(&texts_file).map_err(io_err(&texts_file))?;
    let texts: Vec<String> = serde_json::from_slice(&json)
        .map_err(|source| StoreError::Json { path: texts_file.clone(), source })?;

    if texts.len() != index.len() {
        return Err(StoreError::PartialPersistence {
            prefix: prefix.to_path_buf(),
            reason: format!("{} texts for {} vectors", texts.len(), index.len()),
        });
    }
    if digest(&json) != expected_digest {
        return Err(StoreError::PartialPersistence {
            prefix: prefix.to_path_buf(),
            reason: "text list was not written together with the index".to_string(),
        });
    }
    Ok((index, texts))
}

fn read_index(path: &Path) -> Result<(FlatL2Index, u64)> {
    let file = fs::File::open(path).map_err(io_err(path))?;
    let mut r = BufReader::new(file);
    let corrupt = |reason: String| StoreError::CorruptIndex { path: path.to_path_buf(), reason };

    let mut header = [0u8; HEADER_LEN];
    r.read_exact(&mut header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => corrupt("truncated header".to_string()),
        _ => io_err(path)(e),
    })?;
    if &header[..8] != MAGIC {
        return Err(corrupt("bad magic".to_string()));
    }
    let version = u32::from_le_bytes(le_array(&header[8..12]));
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {version}")));
    }
    let dim = u32::from_le_bytes(le_array(&header[12..16])) as usize;
    let count = u64::from_le_bytes(le_array(&header[16..24]));
    let texts_digest = u64::from_le_bytes(le_array(&header[24..32]));
    if dim == 0 {
        return Err(corrupt("zero dimension".to_string()));
    }

    let body_len = usize::try_from(count)
        .ok()
        .and_then(|c| c.checked_mul(dim))
        .and_then(|values| values.checked_mul(4))
        .ok_or_else(|| corrupt(format!("row count {count} too large")))?;
    let mut body = Vec::new();
    r.read_to_end(&mut body).map_err(io_err(path))?;
    if body.len() != body_len {
        return Err(corrupt(format!("expected {body_len} bytes of vectors, found {}", body.len())));
    }
    let data: Vec<f32> = body.chunks_exact(4).map(|b| f32::from_le_bytes(le_array(b))).collect();
    Ok((FlatL2Index::from_raw(dim, data)?, texts_digest))
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

/// Whether both companion files exist.
pub fn exists(prefix: &Path) -> bool {
    index_path(prefix).is_file() && texts_path(prefix).is_file()
}
