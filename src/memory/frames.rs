/*!
 * Frame Table
 * Free-frame bitmap for paging mode
 */

/// Frame bitmap (`false` = free)
#[derive(Debug, Clone)]
pub(crate) struct FrameTable {
    frames: Vec<bool>,
    free: usize,
}

impl FrameTable {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            frames: vec![false; count],
            free: count,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn free(&self) -> usize {
        self.free
    }

    pub(crate) fn used(&self) -> usize {
        self.frames.len() - self.free
    }

    /// Reserve `count` frames, lowest index first.
    ///
    /// All-or-nothing: returns `None` and touches nothing when fewer than
    /// `count` frames are free.
    pub(crate) fn reserve(&mut self, count: usize) -> Option<Vec<usize>> {
        if count > self.free {
            return None;
        }

        let picked: Vec<usize> = self
            .frames
            .iter()
            .enumerate()
            .filter(|(_, used)| !**used)
            .map(|(index, _)| index)
            .take(count)
            .collect();

        for &index in &picked {
            self.frames[index] = true;
        }
        self.free -= picked.len();
        Some(picked)
    }

    pub(crate) fn release(&mut self, frames: &[usize]) {
        for &index in frames {
            if let Some(slot) = self.frames.get_mut(index) {
                if *slot {
                    *slot = false;
                    self.free += 1;
                }
            }
        }
    }
}
