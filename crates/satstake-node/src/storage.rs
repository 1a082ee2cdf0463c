//! RocksDB-backed persistent record store.
//!
//! Implements [`RecordStore`] using column families for deposits,
//! withdrawals, and metadata. Every append is a single atomic [`WriteBatch`]
//! carrying the record, the advanced sequence counter, and the updated count.
//!
//! Record keys are `len(wallet) as u32 BE || wallet || seq as u64 BE`, so all
//! records of one wallet share a prefix and sort in insertion order.

use std::path::Path;

use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};

use satstake_core::error::StakeError;
use satstake_core::traits::RecordStore;
use satstake_core::types::{DepositRecord, WithdrawalRequest};

// --- Column family names ---

const CF_DEPOSITS: &str = "deposits";
const CF_WITHDRAWALS: &str = "withdrawals";
const CF_METADATA: &str = "metadata";

/// All column family names.
const ALL_CFS: &[&str] = &[CF_DEPOSITS, CF_WITHDRAWALS, CF_METADATA];

// --- Metadata keys ---

const META_NEXT_SEQ: &[u8] = b"next_seq";
const META_DEPOSIT_COUNT: &[u8] = b"deposit_count";
const META_WITHDRAWAL_COUNT: &[u8] = b"withdrawal_count";

/// Length of the trailing sequence number in a record key.
const SEQ_LEN: usize = 8;

fn storage_err(e: impl std::fmt::Display) -> StakeError {
    StakeError::Storage(e.to_string())
}

/// RocksDB-backed record store.
///
/// Appends are serialized through `next_seq` so that two concurrent writers
/// never share a sequence number. Reads do not take the lock.
pub struct RocksStore {
    db: DB,
    /// Next sequence number to assign. Mirrors `META_NEXT_SEQ` on disk.
    next_seq: Mutex<u64>,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path.
    ///
    /// Creates all column families if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StakeError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(storage_err)?;

        let mut store = Self {
            db,
            next_seq: Mutex::new(0),
        };
        let next_seq = store.get_meta_u64(META_NEXT_SEQ)?;
        *store.next_seq.get_mut() = next_seq;

        tracing::info!(
            path = %path.as_ref().display(),
            deposits = store.deposit_count()?,
            withdrawals = store.withdrawal_count()?,
            "record store opened"
        );

        Ok(store)
    }

    /// Number of deposits ever appended.
    pub fn deposit_count(&self) -> Result<u64, StakeError> {
        self.get_meta_u64(META_DEPOSIT_COUNT)
    }

    /// Number of withdrawal requests ever appended.
    pub fn withdrawal_count(&self) -> Result<u64, StakeError> {
        self.get_meta_u64(META_WITHDRAWAL_COUNT)
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), StakeError> {
        self.db.flush().map_err(storage_err)
    }

    // --- Internal helpers ---

    /// Get a u64 from the metadata column family. Absent keys read as 0.
    fn get_meta_u64(&self, key: &[u8]) -> Result<u64, StakeError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, key).map_err(storage_err)? {
            Some(bytes) => <[u8; 8]>::try_from(bytes.as_slice())
                .map(u64::from_be_bytes)
                .map_err(|_| StakeError::Storage("invalid metadata value length".into())),
            None => Ok(0),
        }
    }

    /// Get a column family handle.
    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, StakeError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StakeError::Storage(format!("missing column family: {name}")))
    }

    /// Key prefix shared by every record of `wallet`.
    fn wallet_prefix(wallet: &str) -> Result<Vec<u8>, StakeError> {
        let len = u32::try_from(wallet.len())
            .map_err(|_| StakeError::Storage("wallet identifier too long".into()))?;
        let mut prefix = Vec::with_capacity(4 + wallet.len() + SEQ_LEN);
        prefix.extend_from_slice(&len.to_be_bytes());
        prefix.extend_from_slice(wallet.as_bytes());
        Ok(prefix)
    }

    /// Full record key: wallet prefix followed by the big-endian sequence.
    fn record_key(wallet: &str, seq: u64) -> Result<Vec<u8>, StakeError> {
        let mut key = Self::wallet_prefix(wallet)?;
        key.extend_from_slice(&seq.to_be_bytes());
        Ok(key)
    }

    /// Whether `key` is a record key for exactly the wallet owning `prefix`.
    fn key_matches(key: &[u8], prefix: &[u8]) -> bool {
        key.len() == prefix.len() + SEQ_LEN && key.starts_with(prefix)
    }

    fn encode<T: bincode::Encode>(value: &T) -> Result<Vec<u8>, StakeError> {
        bincode::encode_to_vec(value, bincode::config::standard()).map_err(storage_err)
    }

    fn decode<T: bincode::Decode<()>>(bytes: &[u8]) -> Result<T, StakeError> {
        let (value, _): (T, _) =
            bincode::decode_from_slice(bytes, bincode::config::standard()).map_err(storage_err)?;
        Ok(value)
    }

    /// Append one encoded record to `cf_name`, bumping the sequence and
    /// `count_key` in the same batch.
    fn append(
        &self,
        cf_name: &str,
        count_key: &[u8],
        wallet: &str,
        value: Vec<u8>,
    ) -> Result<u64, StakeError> {
        let cf = self.cf_handle(cf_name)?;
        let cf_meta = self.cf_handle(CF_METADATA)?;

        let mut next_seq = self.next_seq.lock();
        let seq = *next_seq;
        let count = self.get_meta_u64(count_key)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, Self::record_key(wallet, seq)?, value);
        batch.put_cf(cf_meta, META_NEXT_SEQ, (seq + 1).to_be_bytes());
        batch.put_cf(cf_meta, count_key, (count + 1).to_be_bytes());
        self.db.write(batch).map_err(storage_err)?;

        *next_seq = seq + 1;
        Ok(seq)
    }

    /// Every record of `wallet` in `cf_name`, oldest first.
    fn scan_wallet<T: bincode::Decode<()>>(
        &self,
        cf_name: &str,
        wallet: &str,
    ) -> Result<Vec<T>, StakeError> {
        let cf = self.cf_handle(cf_name)?;
        let prefix = Self::wallet_prefix(wallet)?;

        let mut result = Vec::new();
        for item in self.db.prefix_iterator_cf(cf, &prefix) {
            let (key, value) = item.map_err(storage_err)?;
            // prefix_iterator may overshoot without a prefix extractor
            if !key.starts_with(&prefix) {
                break;
            }
            if Self::key_matches(&key, &prefix) {
                result.push(Self::decode(&value)?);
            }
        }
        Ok(result)
    }
}

impl RecordStore for RocksStore {
    fn find_deposit_by_wallet(&self, wallet: &str) -> Result<Option<DepositRecord>, StakeError> {
        let cf = self.cf_handle(CF_DEPOSITS)?;
        let prefix = Self::wallet_prefix(wallet)?;
        let upper = Self::record_key(wallet, u64::MAX)?;

        // Seek to the last key <= prefix||MAX, i.e. the newest record of this wallet.
        let mut iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(upper.as_slice(), Direction::Reverse));
        match iter.next() {
            Some(item) => {
                let (key, value) = item.map_err(storage_err)?;
                if Self::key_matches(&key, &prefix) {
                    Ok(Some(Self::decode(&value)?))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    fn append_deposit(&self, record: &DepositRecord) -> Result<(), StakeError> {
        let seq = self.append(
            CF_DEPOSITS,
            META_DEPOSIT_COUNT,
            &record.wallet,
            Self::encode(record)?,
        )?;
        tracing::debug!(wallet = %record.wallet, seq, "deposit appended");
        Ok(())
    }

    fn append_withdrawal(&self, request: &WithdrawalRequest) -> Result<(), StakeError> {
        let seq = self.append(
            CF_WITHDRAWALS,
            META_WITHDRAWAL_COUNT,
            &request.wallet,
            Self::encode(request)?,
        )?;
        tracing::debug!(wallet = %request.wallet, seq, "withdrawal appended");
        Ok(())
    }

    fn deposits_by_wallet(&self, wallet: &str) -> Result<Vec<DepositRecord>, StakeError> {
        self.scan_wallet(CF_DEPOSITS, wallet)
    }

    fn withdrawals_by_wallet(&self, wallet: &str) -> Result<Vec<WithdrawalRequest>, StakeError> {
        self.scan_wallet(CF_WITHDRAWALS, wallet)
    }
}
