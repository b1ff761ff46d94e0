//! Microstepping driver IC wiring and logic levels.

use serde::Deserialize;

use super::units::{LogicLevel, PinId, StepResolution};

/// Control line of a microstepping driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicrostepLine {
    /// Output enable.
    Enable,
    /// Low-power sleep.
    Sleep,
    /// Translator reset.
    Reset,
    /// Step pulse input.
    Step,
    /// Direction input.
    Dir,
    /// Mode select 1.
    S1,
    /// Mode select 2.
    S2,
    /// Mode select 3.
    S3,
}

/// Pin map and active levels for an external step/dir driver.
///
/// The engine only toggles these lines; subdivision happens inside the IC
/// according to the mode-select values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MicrostepPins {
    /// Enable pin.
    pub enable: PinId,
    /// Sleep pin.
    pub sleep: PinId,
    /// Reset pin.
    pub reset: PinId,
    /// Step pin.
    pub step: PinId,
    /// Direction pin.
    pub dir: PinId,
    /// Mode select pins S1..S3.
    pub mode: [PinId; 3],
    /// Level that enables the outputs.
    pub enable_level: LogicLevel,
    /// Level that puts the driver to sleep.
    pub sleep_level: LogicLevel,
    /// Level that holds the driver in reset.
    pub reset_level: LogicLevel,
    /// Direction level for clockwise rotation.
    pub dir_level: LogicLevel,
    /// Mode select values S1..S3.
    pub mode_values: [LogicLevel; 3],
}

impl MicrostepPins {
    /// Pin assigned to a control line.
    pub fn pin(&self, line: MicrostepLine) -> PinId {
        match line {
            MicrostepLine::Enable => self.enable,
            MicrostepLine::Sleep => self.sleep,
            MicrostepLine::Reset => self.reset,
            MicrostepLine::Step => self.step,
            MicrostepLine::Dir => self.dir,
            MicrostepLine::S1 => self.mode[0],
            MicrostepLine::S2 => self.mode[1],
            MicrostepLine::S3 => self.mode[2],
        }
    }

    /// Assign a pin to a control line.
    pub fn set_pin(&mut self, line: MicrostepLine, pin: PinId) {
        let slot = match line {
            MicrostepLine::Enable => &mut self.enable,
            MicrostepLine::Sleep => &mut self.sleep,
            MicrostepLine::Reset => &mut self.reset,
            MicrostepLine::Step => &mut self.step,
            MicrostepLine::Dir => &mut self.dir,
            MicrostepLine::S1 => &mut self.mode[0],
            MicrostepLine::S2 => &mut self.mode[1],
            MicrostepLine::S3 => &mut self.mode[2],
        };
        *slot = pin;
    }

    /// Set the active level (enable/sleep/reset/dir) or value (S1..S3) of a line.
    ///
    /// The step line has no configurable level; returns `false` for it.
    pub fn set_level(&mut self, line: MicrostepLine, level: LogicLevel) -> bool {
        let slot = match line {
            MicrostepLine::Enable => &mut self.enable_level,
            MicrostepLine::Sleep => &mut self.sleep_level,
            MicrostepLine::Reset => &mut self.reset_level,
            MicrostepLine::Dir => &mut self.dir_level,
            MicrostepLine::S1 => &mut self.mode_values[0],
            MicrostepLine::S2 => &mut self.mode_values[1],
            MicrostepLine::S3 => &mut self.mode_values[2],
            MicrostepLine::Step => return false,
        };
        *slot = level;
        true
    }

    /// Set S1..S3 for a resolution using the DRV8825 mode table.
    pub fn set_mode_for_resolution(&mut self, resolution: StepResolution) {
        self.mode_values = mode_select_for(resolution);
    }
}

/// DRV8825 mode-select values (M0, M1, M2) for a step resolution.
pub fn mode_select_for(resolution: StepResolution) -> [LogicLevel; 3] {
    use LogicLevel::{High as H, Low as L};
    match resolution.value() {
        1 => [L, L, L],
        2 => [H, L, L],
        4 => [L, H, L],
        8 => [H, H, L],
        16 => [L, L, H],
        _ => [H, L, H],
    }
}

impl Default for MicrostepPins {
    fn default() -> Self {
        Self {
            enable: PinId::NOT_DEFINED,
            sleep: PinId::NOT_DEFINED,
            reset: PinId::NOT_DEFINED,
            step: PinId::NOT_DEFINED,
            dir: PinId::NOT_DEFINED,
            mode: [PinId::NOT_DEFINED; 3],
            enable_level: LogicLevel::Low,
            sleep_level: LogicLevel::Low,
            reset_level: LogicLevel::Low,
            dir_level: LogicLevel::High,
            mode_values: [LogicLevel::Low; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pin_and_level() {
        let mut pins = MicrostepPins::default();
        pins.set_pin(MicrostepLine::S2, PinId(5));
        assert_eq!(pins.pin(MicrostepLine::S2), PinId(5));
        assert_eq!(pins.mode[1], PinId(5));

        assert!(pins.set_level(MicrostepLine::Enable, LogicLevel::High));
        assert_eq!(pins.enable_level, LogicLevel::High);
        assert!(!pins.set_level(MicrostepLine::Step, LogicLevel::High));
    }

    #[test]
    fn test_mode_table() {
        let mut pins = MicrostepPins::default();
        pins.set_mode_for_resolution(StepResolution::EIGHTH);
        assert_eq!(pins.mode_values, [LogicLevel::High, LogicLevel::High, LogicLevel::Low]);
        pins.set_mode_for_resolution(StepResolution::FULL);
        assert_eq!(pins.mode_values, [LogicLevel::Low; 3]);
    }
}
