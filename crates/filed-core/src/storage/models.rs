/// One indexed filesystem entry (file or directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Assigned by the store on insert; 0 for records not yet persisted.
    pub id: i64,
    pub path: String,
    pub size: i64,
    /// Unix seconds.
    pub modified_at: i64,
    pub is_directory: bool,
    /// Unix seconds. Set together with `hash`.
    pub hashed_at: Option<i64>,
    /// Lowercase hex content digest.
    pub hash: Option<String>,
}

impl FileRecord {
    pub fn new(path: String, size: i64, modified_at: i64, is_directory: bool) -> Self {
        Self {
            id: 0,
            path,
            size,
            modified_at,
            is_directory,
            hashed_at: None,
            hash: None,
        }
    }

    pub fn is_hashed(&self) -> bool {
        self.hash.is_some()
    }
}

/// A freshly computed content digest for a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDigest {
    pub file_id: i64,
    pub hash: String,
    pub hashed_at: i64,
}

/// One hash group as aggregated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub hash: String,
    pub file_size: i64,
    pub file_count: i64,
    pub total_size: i64,
}

impl DuplicateGroup {
    /// Every member has the same size, so the stored sum is `size × count`.
    pub fn is_consistent(&self) -> bool {
        self.total_size == self.file_size * self.file_count
    }
}

/// Persisted duplicate statistics for one distinct hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateStat {
    pub id: i64,
    pub hash: String,
    pub file_count: i64,
    pub file_size: i64,
    pub total_file_size: i64,
}

impl DuplicateStat {
    pub fn new(hash: String, file_count: i64, file_size: i64) -> Self {
        Self {
            id: 0,
            hash,
            file_count,
            file_size,
            total_file_size: file_size * file_count,
        }
    }
}

impl From<DuplicateGroup> for DuplicateStat {
    fn from(group: DuplicateGroup) -> Self {
        DuplicateStat::new(group.hash, group.file_count, group.file_size)
    }
}
