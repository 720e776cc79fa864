use crate::containers::StorageKey;

/// A handle to a versioned integer cell.
///
/// The cell itself lives in the arena of trailed values owned by the engine; writes through the
/// engine are recorded so that they are undone when restoring an earlier checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailedInteger {
    id: u32,
}

impl StorageKey for TrailedInteger {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}
