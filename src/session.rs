//! Per-grid scroll session.
//!
//! Owned by the collaborator embedding the grid and handed to the body
//! when rows arrive, replacing any process-wide position registry keyed by
//! grid id. Dropping the session forgets the position.

/// Remembered horizontal scroll position for one grid instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollSession {
    scroll_x: Option<f32>,
}

impl ScrollSession {
    /// A session with no remembered position.
    pub fn new() -> Self {
        ScrollSession { scroll_x: None }
    }

    /// Remember a horizontal position. Zero is not worth restoring and is
    /// ignored.
    pub fn remember(&mut self, scroll_x: f32) {
        if scroll_x.abs() > f32::EPSILON {
            self.scroll_x = Some(scroll_x);
        }
    }

    /// The remembered position, if any.
    pub fn restore(&self) -> Option<f32> {
        self.scroll_x
    }

    /// Forget the remembered position.
    pub fn clear(&mut self) {
        self.scroll_x = None;
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn remembers_and_restores() {
        let mut session = ScrollSession::new();
        assert_eq!(session.restore(), None);
        session.remember(120.0);
        assert_eq!(session.restore(), Some(120.0));
    }

    #[test]
    fn zero_is_ignored() {
        let mut session = ScrollSession::new();
        session.remember(0.0);
        assert_eq!(session.restore(), None);
        session.remember(50.0);
        session.remember(0.0);
        assert_eq!(session.restore(), Some(50.0));
    }

    #[test]
    fn clear_forgets() {
        let mut session = ScrollSession::new();
        session.remember(50.0);
        session.clear();
        assert_eq!(session.restore(), None);
    }
}
