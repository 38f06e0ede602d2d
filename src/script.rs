use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ScriptError, TransitionError};
use crate::state::{DeviceEvent, DeviceSnapshot, DeviceStateMachine};

const FORGET: &str = "forget";

/// Parsed event script in the form `device_id|event;device_id|event;...`.
///
/// ```
/// use g1sync::EventScript;
///
/// let script: EventScript = "left|scan_started;left|scan_finished;left|battery=80".parse()?;
/// assert_eq!(3, script.steps().len());
/// # Ok::<(), g1sync::ScriptError>(())
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EventScript {
    steps: Vec<ScriptStep>,
}

impl EventScript {
    /// Returns the parsed steps in order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

impl FromStr for EventScript {
    type Err = ScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(ScriptError::EmptyScript);
        }

        let steps = value
            .split(';')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }
}

/// One script step addressed to a single device.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScriptStep {
    device_id: String,
    action: ScriptAction,
}

/// What a script step does to its device.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ScriptAction {
    /// Feed the event to the state machine.
    Apply(DeviceEvent),
    /// Stop tracking the device.
    Forget,
}

/// Result of applying one accepted script step.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StepOutcome {
    /// The device moved to a new snapshot.
    Changed(Arc<DeviceSnapshot>),
    /// The event restated the current state.
    Unchanged(Arc<DeviceSnapshot>),
    /// The device was dropped; holds its last snapshot if it was tracked.
    Forgotten(Option<Arc<DeviceSnapshot>>),
}

impl ScriptStep {
    /// Creates a step without parsing.
    #[must_use]
    pub fn new(device_id: impl Into<String>, action: ScriptAction) -> Self {
        Self {
            device_id: device_id.into(),
            action,
        }
    }

    /// Returns the addressed device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the step's action.
    #[must_use]
    pub fn action(&self) -> &ScriptAction {
        &self.action
    }

    /// Applies the step to `machine`.
    ///
    /// # Errors
    ///
    /// Returns the state machine's error when the event is rejected.
    pub fn apply(&self, machine: &DeviceStateMachine) -> Result<StepOutcome, TransitionError> {
        let event = match &self.action {
            ScriptAction::Forget => {
                return Ok(StepOutcome::Forgotten(machine.forget(&self.device_id)));
            }
            ScriptAction::Apply(event) => event.clone(),
        };

        let before = machine.current_snapshot(&self.device_id);
        let after = machine.transition(&self.device_id, event)?;
        match before {
            Some(before) if Arc::ptr_eq(&before, &after) => Ok(StepOutcome::Unchanged(after)),
            _ => Ok(StepOutcome::Changed(after)),
        }
    }
}

impl FromStr for ScriptStep {
    type Err = ScriptError;

    fn from_str(raw_step: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = raw_step.split('|').map(str::trim).collect();
        if fields.len() != 2 {
            return Err(ScriptError::InvalidStepFieldCount {
                step: raw_step.trim().to_string(),
            });
        }
        if fields[0].is_empty() || fields[1].is_empty() {
            return Err(ScriptError::EmptyStepField {
                step: raw_step.trim().to_string(),
            });
        }

        let action = if fields[1] == FORGET {
            ScriptAction::Forget
        } else {
            ScriptAction::Apply(fields[1].parse()?)
        };
        Ok(Self::new(fields[0], action))
    }
}

impl fmt::Display for ScriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.device_id, self.action)
    }
}

impl fmt::Display for ScriptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forget => f.write_str(FORGET),
            Self::Apply(DeviceEvent::BatteryReported(level)) => match level.percent() {
                Some(percent) => write!(f, "battery={percent}"),
                None => f.write_str("battery=unknown"),
            },
            Self::Apply(DeviceEvent::FirmwareReported(version)) => write!(f, "firmware={version}"),
            Self::Apply(DeviceEvent::NameResolved(name)) => write!(f, "name={name}"),
            Self::Apply(event) => f.write_str(event.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::state::{BatteryLevel, ConnectionState};

    #[rstest]
    #[case::single("abc|scan_started", 1)]
    #[case::padded(" abc | scan_started ; abc | scan_finished ", 2)]
    #[case::with_forget("abc|scan_started;abc|forget", 2)]
    fn scripts_parse_every_step(#[case] script: &str, #[case] expected_steps: usize) {
        let script: EventScript = script.parse().expect("script should parse");
        assert_eq!(expected_steps, script.steps().len());
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    fn blank_scripts_are_rejected(#[case] script: &str) {
        assert_matches!(script.parse::<EventScript>(), Err(ScriptError::EmptyScript));
    }

    #[rstest]
    #[case::missing_event("abc")]
    #[case::extra_field("abc|scan_started|now")]
    #[case::trailing_separator("abc|scan_started;")]
    fn steps_need_two_fields(#[case] script: &str) {
        assert_matches!(
            script.parse::<EventScript>(),
            Err(ScriptError::InvalidStepFieldCount { .. })
        );
    }

    #[test]
    fn empty_device_field_is_rejected() {
        assert_matches!(
            " |scan_started".parse::<EventScript>(),
            Err(ScriptError::EmptyStepField { step }) if step == "|scan_started"
        );
    }

    #[rstest]
    #[case::forget("abc|forget", ScriptAction::Forget)]
    #[case::event("abc|connect_requested", ScriptAction::Apply(DeviceEvent::ConnectRequested))]
    #[case::metadata(
        "abc|battery=40",
        ScriptAction::Apply(DeviceEvent::BatteryReported(BatteryLevel::new(40).expect("valid battery")))
    )]
    fn steps_parse_into_their_action(#[case] raw: &str, #[case] expected: ScriptAction) {
        let step: ScriptStep = raw.parse().expect("step should parse");
        assert_eq!("abc", step.device_id());
        assert_eq!(&expected, step.action());
    }

    #[test]
    fn event_errors_propagate() {
        assert_matches!(
            "abc|teleport".parse::<EventScript>(),
            Err(ScriptError::UnknownEvent { name }) if name == "teleport"
        );
    }

    #[rstest]
    #[case("abc|scan_started")]
    #[case("abc|battery=82")]
    #[case("abc|battery=unknown")]
    #[case("abc|firmware=1.4.2")]
    #[case("abc|name=Even G1_L")]
    #[case("abc|forget")]
    fn steps_display_in_script_form(#[case] raw: &str) {
        let step: ScriptStep = raw.parse().expect("step should parse");
        assert_eq!(raw, step.to_string());
    }

    #[test]
    fn apply_reports_changed_unchanged_and_forgotten() {
        let machine = DeviceStateMachine::new();
        let script: EventScript = "abc|scan_started;abc|scan_started;abc|forget;abc|forget"
            .parse()
            .expect("script should parse");
        let outcomes: Vec<StepOutcome> = script
            .steps()
            .iter()
            .map(|step| step.apply(&machine).expect("step should be accepted"))
            .collect();

        assert_matches!(&outcomes[0], StepOutcome::Changed(_));
        assert_matches!(&outcomes[1], StepOutcome::Unchanged(_));
        assert_matches!(&outcomes[2], StepOutcome::Forgotten(Some(_)));
        assert_matches!(&outcomes[3], StepOutcome::Forgotten(None));
    }

    #[test]
    fn rejected_step_returns_the_transition_error() {
        let machine = DeviceStateMachine::new();
        let step = ScriptStep::new("abc", ScriptAction::Apply(DeviceEvent::ConnectRequested));
        assert_matches!(
            step.apply(&machine),
            Err(TransitionError::UnknownDevice { .. })
        );
    }

    #[test]
    fn metadata_steps_update_the_snapshot() {
        let machine = DeviceStateMachine::new();
        let script: EventScript = "abc|scan_started;abc|scan_finished;abc|battery=40"
            .parse()
            .expect("script should parse");
        for step in script.steps() {
            step.apply(&machine).expect("step should be accepted");
        }

        let snapshot = machine.current_snapshot("abc").expect("device is tracked");
        assert_eq!(BatteryLevel::new(40).expect("valid battery"), snapshot.battery());
        assert_eq!(ConnectionState::Disconnected, snapshot.connection_state());
    }
}
