use crate::sensirion::Command;

pub const GET_SERIAL_ID: Command = Command::new("get_serial_id", [0x36, 0x82], 10, 3);
pub const GET_FEATURE_SET: Command = Command::new("get_feature_set", [0x20, 0x2f], 10, 1);
pub const IAQ_INIT: Command = Command::new("iaq_init", [0x20, 0x03], 10, 0);
pub const MEASURE_IAQ: Command = Command::new("measure_iaq", [0x20, 0x08], 50, 2);
pub const GET_IAQ_BASELINE: Command = Command::new("get_iaq_baseline", [0x20, 0x15], 10, 2);
/// Followed by the TVOC and CO2eq baseline words, in that order.
pub const SET_IAQ_BASELINE: Command = Command::new("set_iaq_baseline", [0x20, 0x1e], 10, 0);
