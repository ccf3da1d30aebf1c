//! Arena of wireframe line resources indexed by detection position.
//!
//! The only mutation that changes the pool's length is
//! [`EdgePool::resize`]: grow by allocating from the scene factory, shrink
//! by truncating. Truncated resources are dropped, which releases them from
//! the scene. Entries that survive a resize keep their content.

use detview_env::SceneResourceFactory;

/// Outcome of a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolResize {
    /// Entries allocated by this resize
    pub allocated: usize,
    
    /// Entries released by this resize
    pub released: usize,
}

/// Line resources, one per detection slot.
#[derive(Debug)]
pub struct EdgePool<L> {
    lines: Vec<L>,
}

impl<L> EdgePool<L> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }
    
    /// Resizes the pool to exactly `len` entries, allocating new entries
    /// with `allocate`.
    pub fn resize_with(&mut self, len: usize, mut allocate: impl FnMut() -> L) -> PoolResize {
        let current = self.lines.len();
        
        if len > current {
            self.lines.reserve_exact(len - current);
            self.lines.extend((current..len).map(|_| allocate()));
            PoolResize {
                allocated: len - current,
                released: 0,
            }
        } else {
            self.lines.truncate(len);
            PoolResize {
                allocated: 0,
                released: current - len,
            }
        }
    }
    
    /// Releases every entry.
    pub fn clear(&mut self) -> PoolResize {
        let released = self.lines.len();
        self.lines.clear();
        PoolResize {
            allocated: 0,
            released,
        }
    }
    
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    
    pub fn get(&self, index: usize) -> Option<&L> {
        self.lines.get(index)
    }
    
    pub fn get_mut(&mut self, index: usize) -> Option<&mut L> {
        self.lines.get_mut(index)
    }
    
    pub fn iter(&self) -> std::slice::Iter<'_, L> {
        self.lines.iter()
    }
    
    /// Resizes the pool to exactly `len` entries, allocating new entries
    /// from `factory`.
    pub fn resize<F>(&mut self, len: usize, factory: &mut F) -> PoolResize
    where
        F: SceneResourceFactory<Line = L> + ?Sized,
    {
        self.resize_with(len, || factory.create_line())
    }
}

impl<L> Default for EdgePool<L> {
    fn default() -> Self {
        Self::new()
    }
}
