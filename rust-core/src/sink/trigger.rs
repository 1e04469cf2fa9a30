//! Trigger engine deciding which computed frames reach the consumer
//!
//! Free and Auto admit everything, Normal admits only frames where the trigger
//! row crosses the level, Tag admits only batches carrying a named marker.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{SinkError, SinkResult};

/// Trigger modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Free running, every frame is admitted
    #[default]
    Free,
    /// Every frame is admitted; crossings are flagged
    Auto,
    /// Only frames crossing the level are admitted
    Normal,
    /// Only batches carrying a tag named `tag_key` are admitted
    Tag,
}

impl TriggerMode {
    /// Whether the mode evaluates a spectrum row
    pub fn uses_channel(&self) -> bool {
        matches!(self, TriggerMode::Auto | TriggerMode::Normal)
    }
}

/// Trigger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerState {
    pub mode: TriggerMode,
    /// Level in dB compared against every bin
    pub level: f32,
    /// Input channel inspected in Auto/Normal mode
    pub channel: usize,
    /// Tag name matched exactly in Tag mode
    pub tag_key: String,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            mode: TriggerMode::Free,
            level: 0.0,
            channel: 0,
            tag_key: String::new(),
        }
    }
}

/// What the trigger decided for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Frame goes to the queue
    pub admit: bool,
    /// Trigger condition was observed
    pub triggered: bool,
}

/// Per-batch admission gate
#[derive(Debug, Default)]
pub struct TriggerEngine {
    state: TriggerState,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the trigger configuration
    ///
    /// Auto and Normal need `channel < channel_count`. On error the previous
    /// configuration stays active.
    pub fn configure(&mut self, state: TriggerState, channel_count: usize) -> SinkResult<()> {
        if state.mode.uses_channel() && state.channel >= channel_count {
            return Err(SinkError::TriggerChannel {
                channel: state.channel,
                channel_count,
            });
        }
        self.state = state;
        Ok(())
    }

    /// Decide admission for a frame
    ///
    /// # Arguments
    /// * `trigger_row` - Spectrum row inspected by Auto/Normal
    /// * `tag_seen` - Whether the batch carried `tag_key` (see [`Self::matches_tag`])
    pub fn evaluate(&self, trigger_row: ArrayView1<'_, f32>, tag_seen: bool) -> Admission {
        match self.state.mode {
            TriggerMode::Free => Admission {
                admit: true,
                triggered: false,
            },
            TriggerMode::Auto => Admission {
                admit: true,
                triggered: self.crosses_level(trigger_row),
            },
            TriggerMode::Normal => {
                let crossed = self.crosses_level(trigger_row);
                Admission {
                    admit: crossed,
                    triggered: crossed,
                }
            }
            TriggerMode::Tag => Admission {
                admit: tag_seen,
                triggered: tag_seen,
            },
        }
    }

    /// Exact name comparison against the configured key
    pub fn matches_tag(&self, key: &str) -> bool {
        self.state.mode == TriggerMode::Tag && key == self.state.tag_key
    }

    fn crosses_level(&self, row: ArrayView1<'_, f32>) -> bool {
        row.iter().any(|&v| v > self.state.level)
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn mode(&self) -> TriggerMode {
        self.state.mode
    }

    pub fn channel(&self) -> usize {
        self.state.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn with_peak(peak: f32) -> Array1<f32> {
        let mut row = Array1::from_elem(64, -120.0f32);
        row[20] = peak;
        row
    }

    fn engine(mode: TriggerMode, level: f32) -> TriggerEngine {
        let mut engine = TriggerEngine::new();
        engine
            .configure(
                TriggerState {
                    mode,
                    level,
                    channel: 0,
                    tag_key: "burst".to_string(),
                },
                2,
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_free_admits_everything() {
        let engine = engine(TriggerMode::Free, 0.0);
        let admission = engine.evaluate(with_peak(-90.0).view(), false);
        assert!(admission.admit);
        assert!(!admission.triggered);
    }

    #[test]
    fn test_normal_gates_on_level() {
        let engine = engine(TriggerMode::Normal, -20.0);

        let above = engine.evaluate(with_peak(-10.0).view(), false);
        assert!(above.admit && above.triggered);

        let below = engine.evaluate(with_peak(-30.0).view(), false);
        assert!(!below.admit && !below.triggered);

        // Equal to the level does not exceed it
        let equal = engine.evaluate(with_peak(-20.0).view(), false);
        assert!(!equal.admit);
    }

    #[test]
    fn test_auto_flags_but_admits() {
        let engine = engine(TriggerMode::Auto, -20.0);

        let above = engine.evaluate(with_peak(-10.0).view(), false);
        assert!(above.admit && above.triggered);

        let below = engine.evaluate(with_peak(-30.0).view(), false);
        assert!(below.admit && !below.triggered);
    }

    #[test]
    fn test_tag_mode_ignores_magnitude() {
        let engine = engine(TriggerMode::Tag, -200.0);

        assert!(!engine.evaluate(with_peak(0.0).view(), false).admit);
        assert!(engine.evaluate(with_peak(-150.0).view(), true).admit);

        assert!(engine.matches_tag("burst"));
        assert!(!engine.matches_tag("burst2"));
        assert!(!engine.matches_tag("bur*"));
    }

    #[test]
    fn test_tag_key_ignored_outside_tag_mode() {
        let engine = engine(TriggerMode::Free, 0.0);
        assert!(!engine.matches_tag("burst"));
    }

    #[test]
    fn test_channel_out_of_range_keeps_previous() {
        let mut engine = engine(TriggerMode::Auto, -20.0);

        let result = engine.configure(
            TriggerState {
                mode: TriggerMode::Normal,
                level: 0.0,
                channel: 2,
                tag_key: String::new(),
            },
            2,
        );

        assert_eq!(
            result,
            Err(SinkError::TriggerChannel {
                channel: 2,
                channel_count: 2
            })
        );
        assert_eq!(engine.mode(), TriggerMode::Auto);
        assert_eq!(engine.state().level, -20.0);
    }

    #[test]
    fn test_free_and_tag_accept_any_channel() {
        let mut engine = TriggerEngine::new();
        let state = TriggerState {
            mode: TriggerMode::Tag,
            level: 0.0,
            channel: 7,
            tag_key: "sob".to_string(),
        };
        assert!(engine.configure(state, 0).is_ok());
    }
}
