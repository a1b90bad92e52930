//! Binary checkpoint format for the Grundy memo.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "MSG1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Entry count: u32 LE (4 bytes)
//!   - Key length: u32 LE (4 bytes), one byte per board cell
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Fingerprint: u64 LE (8 bytes), see [`fingerprint`]
//! - Data section (entry_count × (key_len + 4) bytes):
//!   - Position key: key_len mark codes
//!   - Grundy value: u32 LE (4 bytes)
//!
//! Entries are sorted by key for potential binary search.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use mosaic_core::{Board, EngineConfig, PositionKey, Ruleset};
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

const MAGIC: &[u8; 4] = b"MSG1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const VALUE_SIZE: usize = 4;

/// Identity of the game a memo belongs to: the board's cells plus the rule
/// switches that change the option sets. Any edit to either gives a new value.
pub fn fingerprint(board: &Board, engine: &EngineConfig) -> u64 {
    let mut bytes = Vec::with_capacity(board.len() * 8 + 3);
    for cell in board.cells() {
        bytes.extend_from_slice(&cell.x.to_le_bytes());
        bytes.extend_from_slice(&cell.y.to_le_bytes());
    }
    bytes.push(engine.all_small as u8);
    bytes.push(engine.row_retirement as u8);
    bytes.push(match engine.ruleset {
        Ruleset::PerComponentTop => 0,
        Ruleset::GlobalTop => 1,
    });
    xxh64(&bytes, 0)
}

fn invalid_data(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

#[derive(Debug)]
pub struct Checkpoint {
    pub fingerprint: u64,
    pub entries: Vec<(PositionKey, u32)>,
}

impl Checkpoint {
    /// Save a Grundy table to a binary checkpoint file.
    ///
    /// All keys must have the same length (they come from one board).
    pub fn save(
        path: &Path,
        fingerprint: u64,
        table: &HashMap<PositionKey, u32>,
    ) -> io::Result<usize> {
        let mut entries: Vec<(&PositionKey, u32)> = table.iter().map(|(k, &v)| (k, v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let count = entries.len();
        let key_len = entries.first().map_or(0, |(k, _)| k.as_bytes().len());
        if entries.iter().any(|(k, _)| k.as_bytes().len() != key_len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Position keys of different lengths in one table",
            ));
        }
        let count_u32 = u32::try_from(count)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Too many entries"))?;
        let key_len_u32 = u32::try_from(key_len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Key too long"))?;

        // Build data section
        let mut data = Vec::with_capacity(count * (key_len + VALUE_SIZE));
        for (key, grundy) in &entries {
            data.extend_from_slice(key.as_bytes());
            data.extend_from_slice(&grundy.to_le_bytes());
        }

        let checksum = xxh64(&data, 0);

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        // Header
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&count_u32.to_le_bytes())?;
        writer.write_all(&key_len_u32.to_le_bytes())?;
        writer.write_all(&checksum.to_le_bytes())?;
        writer.write_all(&fingerprint.to_le_bytes())?;

        // Data
        writer.write_all(&data)?;
        writer.flush()?;

        debug!(path = %path.display(), count, "checkpoint saved");
        Ok(count)
    }

    /// Load checkpoint from binary file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid_data("Invalid checkpoint magic"));
        }

        let version = read_u32(&header, 4);
        if version != VERSION {
            return Err(invalid_data(format!("Unsupported checkpoint version: {}", version)));
        }

        let count = read_u32(&header, 8) as usize;
        let key_len = read_u32(&header, 12) as usize;
        let stored_checksum = read_u64(&header, 16);
        let fingerprint = read_u64(&header, 24);

        // Header sizes must describe exactly the bytes on disk before anything is allocated.
        let entry_size = key_len
            .checked_add(VALUE_SIZE)
            .ok_or_else(|| invalid_data("Checkpoint key length overflows"))?;
        let data_len = count
            .checked_mul(entry_size)
            .ok_or_else(|| invalid_data("Checkpoint data size overflows"))?;
        if (data_len as u64).checked_add(HEADER_SIZE as u64) != Some(file_len) {
            return Err(invalid_data(format!(
                "Checkpoint header claims {} data bytes, file holds {}",
                data_len,
                file_len.saturating_sub(HEADER_SIZE as u64)
            )));
        }
        let mut data = vec![0u8; data_len];
        reader.read_exact(&mut data)?;

        if xxh64(&data, 0) != stored_checksum {
            return Err(invalid_data("Checkpoint checksum mismatch"));
        }

        let entries = data
            .chunks_exact(entry_size)
            .map(|chunk| {
                let key = PositionKey::from_bytes(chunk[..key_len].to_vec());
                (key, read_u32(chunk, key_len))
            })
            .collect();

        Ok(Checkpoint {
            fingerprint,
            entries,
        })
    }

    /// Load a checkpoint, refusing it unless it was written for `fingerprint`.
    pub fn load_for(path: &Path, fingerprint: u64) -> io::Result<Self> {
        let checkpoint = Self::load(path)?;
        if checkpoint.fingerprint != fingerprint {
            return Err(invalid_data(format!(
                "Checkpoint belongs to another board (fingerprint {:016x}, expected {:016x})",
                checkpoint.fingerprint, fingerprint
            )));
        }
        Ok(checkpoint)
    }

    /// Get file size estimate for a given number of entries.
    pub fn estimate_size(count: usize, key_len: usize) -> usize {
        HEADER_SIZE + count * (key_len + VALUE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::{Cell, Mark, Position};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}_{}.bin", name, std::process::id()))
    }

    fn sample_table(board: &Board) -> HashMap<PositionKey, u32> {
        let mut table = HashMap::new();
        let mut pos = Position::new(board.clone());
        table.insert(pos.key(), 2);
        pos.set_mark(Cell::new(0, 0), Mark::Left).unwrap();
        table.insert(pos.key(), 0);
        pos.set_mark(Cell::new(1, 0), Mark::Small).unwrap();
        table.insert(pos.key(), 7);
        table
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let path = temp_path("test_checkpoint");
        let board = Board::rectangle(3, 2);
        let fp = fingerprint(&board, &EngineConfig::default());
        let table = sample_table(&board);

        let saved = Checkpoint::save(&path, fp, &table).unwrap();
        assert_eq!(saved, 3);
        let size = std::fs::metadata(&path).unwrap().len() as usize;
        assert_eq!(size, Checkpoint::estimate_size(3, 6));

        let loaded = Checkpoint::load_for(&path, fp).unwrap();
        assert_eq!(loaded.fingerprint, fp);
        let loaded_map: HashMap<PositionKey, u32> = loaded.entries.into_iter().collect();
        assert_eq!(loaded_map, table);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_fingerprint_mismatch_refused() {
        let path = temp_path("test_checkpoint_fp");
        let board = Board::rectangle(3, 2);
        let fp = fingerprint(&board, &EngineConfig::default());
        Checkpoint::save(&path, fp, &sample_table(&board)).unwrap();

        let mut edited = board.clone();
        edited.add_cell(Cell::new(3, 0)).unwrap();
        let other = fingerprint(&edited, &EngineConfig::default());
        assert_ne!(fp, other);
        let err = Checkpoint::load_for(&path, other).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_fingerprint_covers_rules() {
        let board = Board::rectangle(2, 2);
        let plain = fingerprint(&board, &EngineConfig::default());
        let small = fingerprint(&board, &EngineConfig::default().with_all_small(true));
        let global = fingerprint(
            &board,
            &EngineConfig::default().with_ruleset(Ruleset::GlobalTop),
        );
        assert_ne!(plain, small);
        assert_ne!(plain, global);
        assert_eq!(plain, fingerprint(&board.clone(), &EngineConfig::default()));
    }

    #[test]
    fn test_corrupt_data_rejected() {
        let path = temp_path("test_checkpoint_corrupt");
        let board = Board::rectangle(3, 2);
        Checkpoint::save(&path, 1, &sample_table(&board)).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_oversized_header_rejected() {
        let path = temp_path("test_checkpoint_oversized");
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        std::fs::write(&path, &bytes).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_truncated_data_rejected() {
        let path = temp_path("test_checkpoint_truncated");
        let board = Board::rectangle(3, 2);
        Checkpoint::save(&path, 1, &sample_table(&board)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = Checkpoint::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_table() {
        let path = temp_path("test_checkpoint_empty");
        Checkpoint::save(&path, 9, &HashMap::new()).unwrap();
        let loaded = Checkpoint::load(&path).unwrap();
        assert!(loaded.entries.is_empty());
        assert_eq!(loaded.fingerprint, 9);
        std::fs::remove_file(&path).ok();
    }
}
