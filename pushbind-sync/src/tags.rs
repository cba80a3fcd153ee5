//! Segmentation tags derived from session metadata.

use crate::session::SessionSnapshot;
use pushbind_types::Platform;
use std::collections::BTreeMap;

pub const LAUNCH_COUNT: &str = "launch_count";
pub const USER_TYPE: &str = "user_type";
pub const PLATFORM: &str = "platform";

/// `launch_count`, `user_type` (`new` / `returning`) and `platform`.
pub fn session_tags(session: &SessionSnapshot, platform: Platform) -> BTreeMap<String, String> {
    let user_type = if session.is_first_time {
        "new"
    } else {
        "returning"
    };
    BTreeMap::from([
        (LAUNCH_COUNT.to_string(), session.launch_count.to_string()),
        (USER_TYPE.to_string(), user_type.to_string()),
        (PLATFORM.to_string(), platform.name().to_string()),
    ])
}
