// This file is part of run_bdc_controller.
//
// Developed for the embedded software of the multi-actuator rover platform.
// See the COPYRIGHT file at the top-level directory of this distribution
// for details of code ownership.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Debounced, validity-gated digital safety input. An unconfigured switch is
/// invalid and reports no limit and no readjustment whatever the raw pin
/// level is.
#[derive(Debug, Default, Clone, Copy)]
pub struct LimitSwitch {
    _valid: bool,
    _enabled: bool,
    _is_pressed: bool,
    _active_high: bool,
    _used_for_readjustment: bool,
    _limits_forward: bool,
    // Known physical position of the trigger point in radians.
    _associated_position: f32,
}

impl LimitSwitch {
    /// Create a new, not yet configured limit switch.
    ///
    /// # Returns
    /// A new limit switch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the switch and mark it valid. The pressed state is cleared
    /// until the next refresh.
    ///
    /// # Arguments
    /// * `enabled` - Enable the switch or not.
    /// * `active_high` - Raw pin level that counts as pressed.
    /// * `used_for_readjustment` - Supply the readjustment signal or not.
    /// * `limits_forward` - The switch limits the forward travel if true.
    /// Otherwise, the backward travel.
    /// * `associated_position` - Known physical position of the trigger point
    /// in radians.
    pub fn configure(
        &mut self,
        enabled: bool,
        active_high: bool,
        used_for_readjustment: bool,
        limits_forward: bool,
        associated_position: f32,
    ) {
        self._valid = true;
        self._enabled = enabled;
        self._is_pressed = false;
        self._active_high = active_high;
        self._used_for_readjustment = used_for_readjustment;
        self._limits_forward = limits_forward;
        self._associated_position = associated_position;
    }

    /// Refresh the pressed state from a fresh pin read. Call once per control
    /// cycle before any query.
    ///
    /// # Arguments
    /// * `raw_pin_level` - Raw level of the pin.
    pub fn refresh(&mut self, raw_pin_level: bool) {
        if self._enabled {
            self._is_pressed = raw_pin_level == self._active_high;
        } else {
            self._is_pressed = false;
        }
    }

    /// Is the switch configured?
    ///
    /// # Returns
    /// True if the switch was configured. Otherwise, false.
    pub fn is_valid(&self) -> bool {
        self._valid
    }

    /// Is the switch pressed?
    ///
    /// # Returns
    /// True if the switch is enabled and pressed. Otherwise, false.
    pub fn pressed(&self) -> bool {
        self._is_pressed
    }

    /// Does the switch stop the forward travel right now?
    ///
    /// # Returns
    /// True if the switch is valid, enabled, pressed, and limits forward.
    pub fn is_forward_limit(&self) -> bool {
        self._valid && self._enabled && self._is_pressed && self._limits_forward
    }

    /// Does the switch stop the backward travel right now?
    ///
    /// # Returns
    /// True if the switch is valid, enabled, pressed, and limits backward.
    pub fn is_backward_limit(&self) -> bool {
        self._valid && self._enabled && self._is_pressed && !self._limits_forward
    }

    /// Get the position to readjust the tracked estimate to. When pressed,
    /// the control loop may snap its estimate to this known physical
    /// reference to correct long-run drift.
    ///
    /// # Returns
    /// The associated position if the switch is valid, enabled, used for the
    /// readjustment, and pressed. Otherwise, None.
    pub fn readjustment_position(&self) -> Option<f32> {
        if self._valid && self._enabled && self._used_for_readjustment && self._is_pressed {
            Some(self._associated_position)
        } else {
            None
        }
    }

    /// Enable the switch.
    pub fn enable(&mut self) {
        self._enabled = true;
    }

    /// Disable the switch. The pressed state clears immediately instead of
    /// waiting for the next refresh.
    pub fn disable(&mut self) {
        self._enabled = false;
        self._is_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_limit_switch(enabled: bool, active_high: bool) -> LimitSwitch {
        let mut limit_switch = LimitSwitch::new();
        limit_switch.configure(enabled, active_high, true, true, 1.5);

        limit_switch
    }

    #[test]
    fn test_refresh() {
        let mut limit_switch = create_limit_switch(true, true);

        limit_switch.refresh(true);
        assert!(limit_switch.pressed());

        limit_switch.refresh(false);
        assert!(!limit_switch.pressed());

        // Active low.
        let mut limit_switch = create_limit_switch(true, false);

        limit_switch.refresh(false);
        assert!(limit_switch.pressed());
    }

    #[test]
    fn test_refresh_disabled() {
        // A disabled switch is never pressed, for any raw level and any
        // polarity.
        for active_high in [false, true] {
            let mut limit_switch = create_limit_switch(false, active_high);

            for raw_pin_level in [false, true] {
                limit_switch.refresh(raw_pin_level);

                assert!(!limit_switch.pressed());
                assert!(!limit_switch.is_forward_limit());
            }
        }
    }

    #[test]
    fn test_invalid_reports_nothing() {
        let mut limit_switch = LimitSwitch::new();
        limit_switch.enable();
        limit_switch.refresh(true);

        assert!(!limit_switch.is_forward_limit());
        assert!(!limit_switch.is_backward_limit());
        assert!(limit_switch.readjustment_position().is_none());
    }

    #[test]
    fn test_limit_direction() {
        let mut limit_switch = LimitSwitch::new();
        limit_switch.configure(true, true, false, false, 0.0);
        limit_switch.refresh(true);

        assert!(!limit_switch.is_forward_limit());
        assert!(limit_switch.is_backward_limit());
    }

    #[test]
    fn test_readjustment_position() {
        let mut limit_switch = create_limit_switch(true, true);

        assert!(limit_switch.readjustment_position().is_none());

        limit_switch.refresh(true);

        assert_eq!(limit_switch.readjustment_position(), Some(1.5));

        // Not used for the readjustment.
        let mut limit_switch = LimitSwitch::new();
        limit_switch.configure(true, true, false, true, 1.5);
        limit_switch.refresh(true);

        assert!(limit_switch.readjustment_position().is_none());
    }

    #[test]
    fn test_enable_disable() {
        let mut limit_switch = create_limit_switch(true, true);
        limit_switch.refresh(true);

        assert!(limit_switch.pressed());

        // Disabling clears the pressed state immediately.
        limit_switch.disable();

        assert!(!limit_switch.pressed());
        assert!(limit_switch.readjustment_position().is_none());

        limit_switch.enable();
        limit_switch.refresh(true);

        assert!(limit_switch.pressed());
    }
}
