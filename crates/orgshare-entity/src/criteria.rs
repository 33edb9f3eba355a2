//! User selection criteria.

use std::collections::HashMap;

use orgshare_core::types::UserId;

/// The only criteria key currently recognized: an explicit user ID list.
pub const USER_IDS: &str = "userIds";

/// User criteria as received: a mapping from a criteria tag to its value.
///
/// Only [`USER_IDS`] is recognized. A `None` value models an explicit
/// `null` under the key.
pub type UserCriteria = HashMap<String, Option<Vec<UserId>>>;
