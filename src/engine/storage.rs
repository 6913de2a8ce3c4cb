use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persistent storage is unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("stored value {0:?} is not a score")]
    Corrupt(String),
}

pub trait ScoreStore {
    fn load(&self) -> Result<u32, StorageError>;
    fn save(&mut self, score: u32) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    value: Option<u32>,
}

impl MemoryStore {
    pub fn with_score(score: u32) -> Self {
        MemoryStore { value: Some(score) }
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<u32, StorageError> {
        Ok(self.value.unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        self.value = Some(score);
        Ok(())
    }
}

/// Stand-in when no backend exists; every call reports `Unavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStore;

impl ScoreStore for NoStore {
    fn load(&self) -> Result<u32, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn save(&mut self, _score: u32) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

pub struct BrowserStore {
    storage: web_sys::Storage,
    key: String,
}

impl BrowserStore {
    pub fn open(key: &str) -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))?
            .ok_or(StorageError::Unavailable)?;
        Ok(BrowserStore { storage, key: key.to_string() })
    }
}

impl ScoreStore for BrowserStore {
    fn load(&self) -> Result<u32, StorageError> {
        let value = self
            .storage
            .get_item(&self.key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))?;
        match value {
            None => Ok(0),
            Some(text) => text.trim().parse().map_err(|_| StorageError::Corrupt(text)),
        }
    }

    fn save(&mut self, score: u32) -> Result<(), StorageError> {
        self.storage
            .set_item(&self.key, &score.to_string())
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}
