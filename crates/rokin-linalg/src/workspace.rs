/// Scratch memory shared by the `*_in` variants of [`crate::Matrix`] solvers.
///
/// Buffers grow on demand and are never shrunk, so a solver called
/// repeatedly with the same shapes only allocates on its first call.
#[derive(Debug, Default, Clone)]
pub struct Workspace {
    floats: Vec<f32>,
    pivots: Vec<usize>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a workspace with room for `len` floats.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            floats: vec![0.0; len],
            pivots: Vec::new(),
        }
    }

    /// Borrow at least `len` floats of scratch.
    pub fn floats(&mut self, len: usize) -> &mut [f32] {
        if self.floats.len() < len {
            self.floats.resize(len, 0.0);
        }
        &mut self.floats[..len]
    }

    /// Borrow `len` floats and `npiv` pivot slots at the same time.
    pub fn floats_and_pivots(&mut self, len: usize, npiv: usize) -> (&mut [f32], &mut [usize]) {
        if self.pivots.len() < npiv {
            self.pivots.resize(npiv, 0);
        }
        if self.floats.len() < len {
            self.floats.resize(len, 0.0);
        }
        (&mut self.floats[..len], &mut self.pivots[..npiv])
    }

    /// Number of floats currently held.
    pub fn len(&self) -> usize {
        self.floats.len()
    }

    /// Whether no scratch has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_once() {
        let mut ws = Workspace::new();
        assert!(ws.is_empty());
        ws.floats(16)[3] = 1.0;
        let ptr = ws.floats(8).as_ptr();
        assert_eq!(ws.len(), 16);
        assert_eq!(ws.floats(16).as_ptr(), ptr);
        let (f, p) = ws.floats_and_pivots(4, 3);
        assert_eq!((f.len(), p.len()), (4, 3));
    }
}
