//! Continuous health testing of raw TRNG output.
//!
//! Implements a repetition count test over full 32-bit words. A stuck
//! oscillator shows up as the same word repeated; once the run reaches
//! the cutoff the source is considered failed.

/// Health test violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthViolation {
    #[error("same word repeated {run} times (cutoff {cutoff})")]
    RepeatedWord { run: u32, cutoff: u32 },
}

/// Repetition count test over consecutive words.
#[derive(Debug, Clone)]
pub struct RepetitionCountTest {
    cutoff: u32,
    last: Option<u32>,
    run: u32,
}

impl RepetitionCountTest {
    /// Creates a test that trips after `cutoff` identical words.
    pub fn new(cutoff: u32) -> Self {
        Self {
            cutoff: cutoff.max(2),
            last: None,
            run: 0,
        }
    }

    /// Feeds one word through the test.
    pub fn observe(&mut self, word: u32) -> Result<(), HealthViolation> {
        if self.last == Some(word) {
            self.run += 1;
        } else {
            self.last = Some(word);
            self.run = 1;
        }

        if self.run >= self.cutoff {
            return Err(HealthViolation::RepeatedWord {
                run: self.run,
                cutoff: self.cutoff,
            });
        }
        Ok(())
    }

    /// Returns the current run length.
    pub fn run_length(&self) -> u32 {
        self.run
    }

    /// Returns the configured cutoff.
    pub fn cutoff(&self) -> u32 {
        self.cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_words_pass() {
        let mut rct = RepetitionCountTest::new(2);
        for word in 0..100u32 {
            assert!(rct.observe(word).is_ok());
        }
        assert_eq!(rct.run_length(), 1);
    }

    #[test]
    fn test_trips_at_cutoff() {
        let mut rct = RepetitionCountTest::new(3);
        assert!(rct.observe(0xAAAA_AAAA).is_ok());
        assert!(rct.observe(0xAAAA_AAAA).is_ok());
        assert_eq!(
            rct.observe(0xAAAA_AAAA),
            Err(HealthViolation::RepeatedWord { run: 3, cutoff: 3 })
        );
    }

    #[test]
    fn test_run_resets_on_change() {
        let mut rct = RepetitionCountTest::new(3);
        rct.observe(1).unwrap();
        rct.observe(1).unwrap();
        rct.observe(2).unwrap();
        rct.observe(2).unwrap();
        assert_eq!(rct.run_length(), 2);
    }

    #[test]
    fn test_cutoff_floor() {
        assert_eq!(RepetitionCountTest::new(0).cutoff(), 2);
    }
}
