/// Coalesces redraw requests so at most one redraw runs per frame.
#[derive(Debug, Default, Clone)]
pub struct FrameScheduler {
    pending: bool,
    redraws: u64,
    coalesced: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns false when one is already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            false
        } else {
            self.pending = true;
            true
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending redraw, if any, at a frame boundary.
    pub fn take(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            self.redraws += 1;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_coalesces_to_one_redraw() {
        let mut frames = FrameScheduler::new();
        assert!(frames.request());
        for _ in 0..9 {
            assert!(!frames.request());
        }
        assert!(frames.take());
        assert!(!frames.take());
        assert_eq!(frames.redraw_count(), 1);
        assert_eq!(frames.coalesced_count(), 9);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut frames = FrameScheduler::new();
        frames.request();
        frames.cancel();
        assert!(!frames.take());
        assert_eq!(frames.redraw_count(), 0);
    }
}
