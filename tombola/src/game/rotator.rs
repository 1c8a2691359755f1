//! Round-robin sponsor rotation across draws.

use crate::catalog::Sponsor;

/// Sequential sponsor cycle
///
/// Every eligible sponsor is shown once per full cycle, in feed order, so
/// exposure stays even across a session.
#[derive(Debug, Clone, Default)]
pub struct SponsorRotator {
    /// Eligible pool
    sponsors: Vec<Sponsor>,

    /// Index of the sponsor last returned, `None` before the first call
    cursor: Option<usize>,
}

impl SponsorRotator {
    /// Create an empty rotator
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pool with the eligible subset of `sponsors`
    ///
    /// Showcase-only sponsors and sponsors without a real link are left out.
    /// The cursor goes back to before the first sponsor.
    pub fn set_sponsors(&mut self, sponsors: &[Sponsor]) {
        self.sponsors = sponsors
            .iter()
            .filter(|s| s.is_rotation_eligible())
            .cloned()
            .collect();
        self.cursor = None;

        log::debug!("Sponsor rotation pool set to {} sponsors", self.sponsors.len());
    }

    /// Advance and return the next sponsor, or `None` if the pool is empty
    pub fn next_sponsor(&mut self) -> Option<Sponsor> {
        if self.sponsors.is_empty() {
            return None;
        }

        let next = self.cursor.map_or(0, |c| (c + 1) % self.sponsors.len());
        self.cursor = Some(next);
        self.sponsors.get(next).cloned()
    }

    /// Sponsor last returned by [`next_sponsor`](Self::next_sponsor)
    pub fn peek(&self) -> Option<&Sponsor> {
        self.cursor.and_then(|c| self.sponsors.get(c))
    }

    /// Move the cursor back to before the first sponsor
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.sponsors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sponsors.is_empty()
    }
}
