use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Corpus, CorpusError, NamedVector};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    names: Vec<&'a str>,
    vectors: Vec<&'a [f32]>,
}

#[derive(Deserialize)]
struct StoreFile {
    version: u32,
    names: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

/// Load reads the corpus stored at `path`.
///
/// A missing file is not an error and yields an empty corpus. A file that
/// exists but cannot be read or decoded is always an error: treating it as
/// empty would drop its contents on the next [`persist`].
pub fn load(path: impl AsRef<Path>) -> Result<Corpus, CorpusError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("no corpus at {}, starting empty", path.display());
            return Ok(Corpus::new());
        }
        Err(e) => return Err(CorpusError::io(path, e)),
    };

    let corpus = read_from(BufReader::new(file))?;
    info!("loaded {} vectors from {}", corpus.len(), path.display());
    Ok(corpus)
}

/// Decodes a corpus from a reader and checks its integrity.
///
/// Names and vectors must be aligned, names unique, and all vectors the same
/// non-zero length.
pub fn read_from<R: Read>(r: R) -> Result<Corpus, CorpusError> {
    let file: StoreFile = rmp_serde::from_read(r)?;
    if file.version != FORMAT_VERSION {
        return Err(CorpusError::UnsupportedVersion {
            got: file.version,
            want: FORMAT_VERSION,
        });
    }
    if file.names.len() != file.vectors.len() {
        return Err(CorpusError::Corrupt(format!(
            "{} names, {} vectors",
            file.names.len(),
            file.vectors.len()
        )));
    }

    let entries = file
        .names
        .into_iter()
        .zip(file.vectors)
        .map(|(name, vector)| NamedVector { name, vector })
        .collect();

    let mut corpus = Corpus::new();
    corpus
        .merge(entries)
        .map_err(|e| CorpusError::Corrupt(e.to_string()))?;
    Ok(corpus)
}

/// Encodes the whole corpus to a writer.
pub fn write_to<W: Write + ?Sized>(corpus: &Corpus, w: &mut W) -> Result<(), CorpusError> {
    let file = StoreFileRef {
        version: FORMAT_VERSION,
        names: corpus.names().collect(),
        vectors: corpus.iter().map(|e| e.vector.as_slice()).collect(),
    };
    rmp_serde::encode::write_named(w, &file)?;
    Ok(())
}

/// Persist replaces the file at `path` with the full contents of `corpus`.
///
/// The corpus is written to a temporary file in the same directory, synced,
/// and renamed over `path`, so readers see either the previous file or the
/// new one. The parent directory is created if missing.
pub fn persist(corpus: &Corpus, path: impl AsRef<Path>) -> Result<(), CorpusError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| CorpusError::io(dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".corpus-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| CorpusError::io(dir, e))?;

    {
        let mut bw = BufWriter::new(tmp.as_file_mut());
        write_to(corpus, &mut bw)?;
        bw.flush().map_err(|e| CorpusError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| CorpusError::io(path, e))?;

    // Dropping the handle on error removes the temporary file.
    tmp.persist(path)
        .map_err(|e| CorpusError::io(path, e.error))?;
    sync_dir(dir)?;

    info!("saved {} vectors to {}", corpus.len(), path.display());
    Ok(())
}

/// Flushes the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), CorpusError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| CorpusError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), CorpusError> {
    Ok(())
}
