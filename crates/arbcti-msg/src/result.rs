//! Numeric result/status code → human string tables.

use arbcti_codec::{Fields, Value};
use tracing::warn;

/// Marker substituted for codes missing from a table.
pub const UNKNOWN_RESULT: &str = "unknown";

/// Sparse code table.
#[derive(Debug)]
pub struct ResultTable {
    entries: &'static [(u64, &'static str)],
}

impl ResultTable {
    pub const fn new(entries: &'static [(u64, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, code: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, s)| *s)
    }

    /// First code carrying `text`.
    pub fn code_of(&self, text: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, s)| *s == text)
            .map(|(c, _)| *c)
    }

    pub fn entries(&self) -> &'static [(u64, &'static str)] {
        self.entries
    }

    /// Replace the integer at `field` with its table string.
    ///
    /// Missing codes become [`UNKNOWN_RESULT`] with a warning. Non-integer
    /// values are left untouched.
    pub(crate) fn remap(&self, fields: &mut Fields, field: &str, message: &str) {
        let Some(code) = fields.get(field).and_then(Value::as_i128) else {
            return;
        };
        let text = match u64::try_from(code).ok().and_then(|c| self.lookup(c)) {
            Some(text) => text,
            None => {
                warn!(msg = message, field, code = %code, "unknown result code");
                UNKNOWN_RESULT
            }
        };
        fields.insert(field, Value::Text(text.to_string()));
    }
}

pub static LOGIN_RESULTS: ResultTable = ResultTable::new(&[
    (0, "should not see this"),
    (1, "success"),
    (2, "fail"),
    (3, "already logged in"),
]);

pub static CHANNEL_STATUS: ResultTable = ResultTable::new(&[
    (0, "Idle"),
    (1, "Transition"),
    (2, "Charge"),
    (3, "Discharge"),
    (4, "Rest"),
    (5, "Wait"),
    (6, "External Charge"),
    (7, "Calibration"),
    (8, "Unsafe"),
    (9, "Pulse"),
    (10, "Internal Resistance"),
    (11, "AC Impedance"),
    (12, "ACI Cell"),
    (13, "Test Settings"),
    (14, "Error"),
    (15, "Finished"),
    (16, "Volt Meter"),
    (17, "Waiting for ACS"),
    (18, "Pause"),
    (19, "Empty"),
    (20, "Idle from MCU"),
    (21, "Start"),
    (22, "Running"),
    (23, "Step Transfer"),
    (24, "Resume"),
    (25, "Go Pause"),
    (26, "Go Stop"),
    (27, "Go Next Step"),
    (28, "Online Update"),
    (29, "DAQ Memory Unsafe"),
    (30, "ACR"),
]);

const NOT_USED: &str = "Not used: User should never see this";

pub static ASSIGN_SCHEDULE_RESULTS: ResultTable = ResultTable::new(&[
    (0, "success"),
    (16, "channel does not exist"),
    (17, "Monitor window in use at the moment"),
    (18, "Schedule name cannot be empty"),
    (19, "Schedule name not found"),
    (20, "Channel is running"),
    (21, "Channel is downloading another schedule currently"),
    (22, "Cannot assign schedule when batch file is open"),
    (23, "Assign failed"),
    (24, NOT_USED),
]);

pub static START_SCHEDULE_RESULTS: ResultTable = ResultTable::new(&[
    (0, "success"),
    (16, "Invalid channel index"),
    (
        17,
        "There is a user controlling the monitor window (Start/Resume channel window is open)",
    ),
    (18, "Requested channel is running or unsafe"),
    (19, "Channel not connected to DAQ"),
    (20, "Schedule not compatible with current system configuration"),
    (21, "No schedule assigned to channel"),
    (22, "Schedule version does not match current version of MITS"),
    (23, NOT_USED),
    (24, NOT_USED),
    (25, "Invalid step number"),
    (26, NOT_USED),
    (27, "Invalid auxiliary count in schedule"),
    (28, "Invalid build in auxiliary count"),
    (29, NOT_USED),
    (30, "Check Aux Test Setting tab"),
    (31, "No selected channels"),
    (32, NOT_USED),
    (33, "DAQ still downloading schedule"),
    (
        34,
        "Error querying database (database connection closed most likely)",
    ),
    (35, "Testname cannot be empty"),
    (36, "Invalid step number"),
    (37, "Invalid parallel channel number"),
    (38, "Schedule safety precheck failed"),
    (39, NOT_USED),
    (40, "Battery simulation error"),
]);

pub static STOP_SCHEDULE_RESULTS: ResultTable = ResultTable::new(&[
    (0, "success"),
    (16, "Channel index does not exist"),
    (17, "Someone else is controlling monitor window at the moment"),
    (18, NOT_USED),
    (19, NOT_USED),
]);

pub static SET_META_VARIABLE_RESULTS: ResultTable = ResultTable::new(&[
    (0, "success"),
    (16, "Set MV Failure"),
    (17, "Channel is not running"),
    (18, "Meta code does not exist"),
]);

pub static JUMP_CHANNEL_RESULTS: ResultTable = ResultTable::new(&[
    (0, "success"),
    (16, "Invalid channel index"),
    (17, "Channel is not running"),
    (18, "Monitor window in use at the moment"),
    (19, "Invalid step number"),
]);
