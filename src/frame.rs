//! Redraw coalescing.
//!
//! Any number of redraw requests between two frames result in a single
//! draw. The host asks the windowing system for a frame only when the
//! scheduler goes from clean to dirty.

#[derive(Debug, Default)]
pub struct FrameScheduler {
    dirty: bool,
    frames_drawn: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the view dirty. Returns `true` if a frame must be requested from
    /// the host, `false` if one is already pending.
    pub fn request(&mut self) -> bool {
        let newly_scheduled = !self.dirty;
        self.dirty = true;
        newly_scheduled
    }

    /// Called at the start of a host frame. Clears the dirty flag so requests
    /// made while drawing schedule the next frame.
    pub fn begin_frame(&mut self) {
        self.dirty = false;
        self.frames_drawn += 1;
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}
