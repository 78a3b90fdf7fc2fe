use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::{debug, warn};

use prov_ledger::{Block, ChainStore, ConflictReason, LedgerError};
use prov_types::{BlockHash, ListingId};

use crate::error::StoreError;

/// Flush/sync strategy for the block log.
#[derive(Clone, Copy, Debug, Default)]
pub enum SyncMode {
    /// `fsync` after every append (safest, highest latency).
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    #[default]
    OsDefault,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Per-listing index rebuilt from the log on open.
struct ChainIndex {
    /// Byte offset of each block's frame, in chain order.
    offsets: Vec<u64>,
    /// Hash of the last block, for the conditional-append tail check.
    tail_hash: BlockHash,
}

impl Default for ChainIndex {
    fn default() -> Self {
        Self {
            offsets: Vec::new(),
            // An empty chain's tail is the genesis sentinel.
            tail_hash: BlockHash::SENTINEL,
        }
    }
}

struct LogWriter {
    writer: BufWriter<File>,
    /// Current write offset in the log file.
    offset: u64,
}

/// Durable, crash-recoverable chain store.
///
/// Blocks from all chains are appended to a single log file. On-disk frame:
///
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Block)]
/// ```
///
/// On open the file is scanned front-to-back to rebuild per-listing
/// indexes. An incomplete frame at the tail is a torn write from a crash
/// and is truncated away; a CRC failure anywhere else is corruption and
/// fails the open. There is no truncate or compaction entry point: chains
/// are audit records and are retained indefinitely.
pub struct FileChainStore {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    index: RwLock<HashMap<ListingId, ChainIndex>>,
    sync_mode: SyncMode,
}

impl FileChainStore {
    /// Open (or create) the block log at the given path and recover its
    /// indexes.
    pub fn open(path: &Path, sync_mode: SyncMode) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let index = Self::recover(path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter {
                writer: BufWriter::new(file),
                offset,
            }),
            index: RwLock::new(index),
            sync_mode,
        })
    }

    /// Scan the log front-to-back, rebuilding the per-listing indexes.
    ///
    /// A torn tail (incomplete header or payload) is truncated away so
    /// later appends start on a frame boundary. An interior frame that
    /// fails its CRC is a hole in a hash chain and fails recovery outright.
    fn recover(path: &Path) -> Result<HashMap<ListingId, ChainIndex>, StoreError> {
        let mut index: HashMap<ListingId, ChainIndex> = HashMap::new();

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(index),
            Err(e) => return Err(e.into()),
        };
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            let mut header = [0u8; HEADER_SIZE];
            reader.read_exact(&mut header)?;
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length == 0 {
                return Err(StoreError::Corrupt {
                    offset,
                    reason: "zero-length frame".into(),
                });
            }
            if offset + HEADER_SIZE as u64 + u64::from(length) > file_len {
                // Torn write: the crash happened mid-frame.
                warn!(offset, length, file_len, "torn tail frame; truncating");
                break;
            }

            let mut payload = vec![0u8; length as usize];
            reader.read_exact(&mut payload)?;

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                return Err(StoreError::Corrupt {
                    offset,
                    reason: format!("crc mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"),
                });
            }

            let block: Block = bincode::deserialize(&payload)
                .map_err(|e| StoreError::Corrupt {
                    offset,
                    reason: format!("undecodable block: {e}"),
                })?;

            let entry = index.entry(block.listing_id).or_default();
            entry.offsets.push(offset);
            entry.tail_hash = block.block_hash;

            offset += HEADER_SIZE as u64 + u64::from(length);
        }

        if offset < file_len {
            // Drop the torn tail so the next append starts on a boundary.
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(offset)?;
        }

        debug!(
            chains = index.len(),
            bytes = offset,
            "block log recovery complete"
        );
        Ok(index)
    }

    /// Read and verify one frame back from disk.
    fn read_block_at(&self, offset: u64) -> Result<Block, StoreError> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header)?;
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let mut payload = vec![0u8; length as usize];
        file.read_exact(&mut payload)?;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            return Err(StoreError::Corrupt {
                offset,
                reason: "crc mismatch on read".into(),
            });
        }

        bincode::deserialize(&payload).map_err(|e| StoreError::Corrupt {
            offset,
            reason: format!("undecodable block: {e}"),
        })
    }

    fn read_index(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ListingId, ChainIndex>>, LedgerError> {
        self.index
            .read()
            .map_err(|_| LedgerError::Store("index lock poisoned".into()))
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainStore for FileChainStore {
    fn append(&self, block: Block) -> Result<(), LedgerError> {
        let payload =
            bincode::serialize(&block).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        let mut w = self
            .writer
            .lock()
            .map_err(|_| LedgerError::Store("writer lock poisoned".into()))?;
        let mut index = self
            .index
            .write()
            .map_err(|_| LedgerError::Store("index lock poisoned".into()))?;

        // Conditional append: the slot and tail must still be what the
        // builder saw. Checked under the writer lock, so it is atomic.
        let entry = index.entry(block.listing_id).or_default();
        let expected = entry.offsets.len() as u64;
        if block.sequence_number != expected {
            return Err(LedgerError::SequenceConflict {
                listing: block.listing_id,
                expected,
                actual: block.sequence_number,
                reason: ConflictReason::SlotOccupied,
            });
        }
        if block.previous_hash != entry.tail_hash {
            return Err(LedgerError::SequenceConflict {
                listing: block.listing_id,
                expected,
                actual: block.sequence_number,
                reason: ConflictReason::StaleTail,
            });
        }

        let frame_offset = w.offset;
        let write = |w: &mut LogWriter| -> Result<(), StoreError> {
            w.writer.write_all(&length.to_le_bytes())?;
            w.writer.write_all(&crc.to_le_bytes())?;
            w.writer.write_all(&payload)?;
            w.writer.flush()?;
            Ok(())
        };
        write(&mut w).map_err(LedgerError::from)?;

        if matches!(self.sync_mode, SyncMode::EveryWrite) {
            w.writer
                .get_ref()
                .sync_all()
                .map_err(|e| LedgerError::Store(e.to_string()))?;
        }

        w.offset += HEADER_SIZE as u64 + u64::from(length);

        // Publish to the index only after the frame is fully flushed, so
        // readers never chase a half-written frame.
        entry.offsets.push(frame_offset);
        entry.tail_hash = block.block_hash;

        debug!(
            listing = %block.listing_id,
            seq = block.sequence_number,
            offset = frame_offset,
            "block appended"
        );
        Ok(())
    }

    fn latest(&self, listing: &ListingId) -> Result<Option<Block>, LedgerError> {
        let offset = {
            let index = self.read_index()?;
            match index.get(listing).and_then(|e| e.offsets.last()) {
                Some(o) => *o,
                None => return Ok(None),
            }
        };
        Ok(Some(self.read_block_at(offset)?))
    }

    fn blocks(&self, listing: &ListingId) -> Result<Vec<Block>, LedgerError> {
        let len = self.chain_len(listing)?;
        self.read_range(listing, 0, len)
    }

    fn read_range(
        &self,
        listing: &ListingId,
        from: u64,
        to: u64,
    ) -> Result<Vec<Block>, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidRange { from, to });
        }
        let offsets: Vec<u64> = {
            let index = self.read_index()?;
            let Some(entry) = index.get(listing) else {
                return Ok(vec![]);
            };
            let start = (from as usize).min(entry.offsets.len());
            let end = (to as usize).min(entry.offsets.len());
            entry.offsets[start..end].to_vec()
        };

        let mut blocks = Vec::with_capacity(offsets.len());
        for offset in offsets {
            blocks.push(self.read_block_at(offset)?);
        }
        Ok(blocks)
    }

    fn chain_len(&self, listing: &ListingId) -> Result<u64, LedgerError> {
        let index = self.read_index()?;
        Ok(index
            .get(listing)
            .map(|e| e.offsets.len() as u64)
            .unwrap_or(0))
    }

    fn listings(&self) -> Result<Vec<ListingId>, LedgerError> {
        let index = self.read_index()?;
        let mut ids: Vec<_> = index.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use prov_ledger::{next_block, ChainValidator};
    use prov_types::{ActorSnapshot, LifecycleAction, MetaValue, Metadata};

    use super::*;

    fn append_chain(store: &FileChainStore, listing: ListingId, events: usize) -> Vec<Block> {
        let mut blocks = Vec::new();
        let genesis = next_block(
            listing,
            LifecycleAction::Created,
            ActorSnapshot::system(),
            Metadata::new(),
            None,
        )
        .unwrap();
        store.append(genesis.clone()).unwrap();
        blocks.push(genesis);

        for i in 0..events {
            let mut metadata = Metadata::new();
            metadata.insert("step".into(), MetaValue::Int(i as i64));
            let block = next_block(
                listing,
                LifecycleAction::Updated,
                ActorSnapshot::system(),
                metadata,
                Some(blocks.last().unwrap()),
            )
            .unwrap();
            store.append(block.clone()).unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn append_and_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        let listing = ListingId::ephemeral();

        let written = append_chain(&store, listing, 3);
        let read = store.blocks(&listing).unwrap();
        assert_eq!(read, written);
        assert_eq!(store.latest(&listing).unwrap().unwrap(), written[3]);
    }

    #[test]
    fn reopen_recovers_chains() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let listing = ListingId::ephemeral();

        let written = {
            let store = FileChainStore::open(&path, SyncMode::EveryWrite).unwrap();
            append_chain(&store, listing, 4)
        };

        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        assert_eq!(store.chain_len(&listing).unwrap(), 5);
        assert_eq!(store.blocks(&listing).unwrap(), written);

        let summary = ChainValidator::validate(&store, &listing).unwrap();
        assert_eq!(summary.length, 5);
    }

    #[test]
    fn reopened_store_continues_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let listing = ListingId::ephemeral();

        {
            let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
            append_chain(&store, listing, 1);
        }

        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        let tail = store.latest(&listing).unwrap().unwrap();
        let next = next_block(
            listing,
            LifecycleAction::Listed,
            ActorSnapshot::system(),
            Metadata::new(),
            Some(&tail),
        )
        .unwrap();
        store.append(next).unwrap();

        assert_eq!(store.chain_len(&listing).unwrap(), 3);
        ChainValidator::validate(&store, &listing).unwrap();
    }

    #[test]
    fn sequence_conflict_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        let listing = ListingId::ephemeral();

        let blocks = append_chain(&store, listing, 1);
        // Replaying the genesis block targets an occupied slot.
        let err = store.append(blocks[0].clone()).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SequenceConflict {
                reason: ConflictReason::SlotOccupied,
                ..
            }
        ));

        // Right slot, wrong lineage: renumbered past the real tail.
        let mut forged = blocks[0].clone();
        forged.sequence_number = 2;
        let err = store.append(forged).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::SequenceConflict {
                reason: ConflictReason::StaleTail,
                ..
            }
        ));
    }

    #[test]
    fn torn_tail_is_truncated_on_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let listing = ListingId::ephemeral();

        {
            let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
            append_chain(&store, listing, 2);
        }

        // Chop the last 4 bytes, simulating a crash mid-frame.
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        let len = file.metadata().unwrap().len();
        file.set_len(len - 4).unwrap();
        drop(file);

        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        assert_eq!(store.chain_len(&listing).unwrap(), 2);

        // The surviving prefix is still a valid chain.
        let summary = ChainValidator::validate(&store, &listing).unwrap();
        assert_eq!(summary.length, 2);
    }

    #[test]
    fn interior_corruption_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let listing = ListingId::ephemeral();

        {
            let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
            append_chain(&store, listing, 2);
        }

        // Flip one byte of the first frame's payload.
        {
            let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xFF;
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            file.write_all(&buf).unwrap();
            file.sync_all().unwrap();
        }

        let Err(err) = FileChainStore::open(&path, SyncMode::default()) else {
            panic!("corrupt log opened cleanly");
        };
        assert!(matches!(err, StoreError::Corrupt { offset: 0, .. }));
    }

    #[test]
    fn multiple_chains_share_one_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();

        let l1 = ListingId::ephemeral();
        let l2 = ListingId::ephemeral();
        append_chain(&store, l1, 2);
        append_chain(&store, l2, 3);

        assert_eq!(store.chain_len(&l1).unwrap(), 3);
        assert_eq!(store.chain_len(&l2).unwrap(), 4);
        assert_eq!(store.listings().unwrap().len(), 2);

        for summary in ChainValidator::validate_all(&store).unwrap() {
            assert!(summary.length > 0);
        }
    }

    #[test]
    fn read_range_pages_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.log");
        let store = FileChainStore::open(&path, SyncMode::default()).unwrap();
        let listing = ListingId::ephemeral();
        let written = append_chain(&store, listing, 5);

        let page = store.read_range(&listing, 2, 4).unwrap();
        assert_eq!(page, written[2..4].to_vec());
        assert!(store.read_range(&listing, 50, 60).unwrap().is_empty());
    }
}
