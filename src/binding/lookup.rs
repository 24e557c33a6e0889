//! Raw value lookup for a field name.

use crate::http::RpcRequest;
use crate::naming::to_snake_case;

/// Find the raw string for `field_name`.
///
/// Search order, first match wins:
/// 1. form data under the wire key (`UserId` → `user_id`)
/// 2. request context under the original name
/// 3. request context under the wire key
pub fn find_value<'r>(field_name: &str, req: &'r RpcRequest) -> Option<&'r str> {
    let wire_key = to_snake_case(field_name);
    req.form
        .get(&wire_key)
        .or_else(|| req.context.get(field_name))
        .or_else(|| req.context.get(&wire_key))
}
