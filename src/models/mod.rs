pub mod leave;
pub mod record;
pub mod work_mode;

pub use leave::{LeaveRequest, LeaveType};
pub use record::{AttendanceDayRecord, DayState, Patch, RecordPatch};
pub use work_mode::WorkMode;
