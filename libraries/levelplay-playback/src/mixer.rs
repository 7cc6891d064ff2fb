//! Hardware mixer bookkeeping
//!
//! The mixer control is persistent, process-wide state. A value written for
//! one track stays active until the next write. Only attenuating decisions
//! are written, and only when they differ from what the hardware already
//! holds; a unity decision leaves the control untouched.

/// Last analog gain known to be active on the hardware control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixerState {
    applied: Option<i32>,
}

impl MixerState {
    /// Nothing written yet; the hardware level is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Last successfully written gain
    pub fn applied(&self) -> Option<i32> {
        self.applied
    }

    /// Whether `gain_db` must be written to the hardware control
    pub fn needs_write(&self, gain_db: i32) -> bool {
        gain_db != 0 && self.applied != Some(gain_db)
    }

    /// Record a successful write
    pub fn record(&mut self, gain_db: i32) {
        self.applied = Some(gain_db);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attenuation_written_from_unknown_level() {
        let state = MixerState::new();
        assert!(state.needs_write(-6));
    }

    #[test]
    fn test_unity_never_written() {
        let mut state = MixerState::new();
        assert!(!state.needs_write(0));

        // Not even after an attenuated track
        state.record(-6);
        assert!(!state.needs_write(0));
        assert_eq!(state.applied(), Some(-6));
    }

    #[test]
    fn test_same_level_skipped() {
        let mut state = MixerState::new();
        state.record(-6);
        assert!(!state.needs_write(-6));
        assert!(state.needs_write(-7));
    }
}
