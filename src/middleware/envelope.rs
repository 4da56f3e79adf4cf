//! Response envelope inspection.
//!
//! Backend responses are JSON objects carrying a `success` flag. Judging a response
//! is a pure function over its buffered body.

use std::str::FromStr;

use serde_json::Value;

// == Success Policy ==
/// How a read response without an explicit `success: true` is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessPolicy {
    /// Anything but `success: false` counts as success, including a missing field
    #[default]
    FailOpen,
    /// Only `success: true` counts as success
    Strict,
}

impl FromStr for SuccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "fail_open" | "open" => Ok(SuccessPolicy::FailOpen),
            "strict" => Ok(SuccessPolicy::Strict),
            other => Err(format!("unknown success policy '{}'", other)),
        }
    }
}

// == Verdict ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// JSON body judged successful under the policy
    Success,
    /// JSON body judged failed under the policy
    Failure,
    /// Body is not JSON; the envelope convention does not apply
    Opaque,
}

/// Judges a buffered response body.
pub fn judge(policy: SuccessPolicy, body: &[u8]) -> Verdict {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) if is_success(policy, &value) => Verdict::Success,
        Ok(_) => Verdict::Failure,
        Err(_) => Verdict::Opaque,
    }
}

/// Applies `policy` to a parsed envelope. Non-object values have no `success` field.
pub fn is_success(policy: SuccessPolicy, envelope: &Value) -> bool {
    match envelope.get("success") {
        Some(Value::Bool(flag)) => *flag,
        _ => policy == SuccessPolicy::FailOpen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_flags() {
        for policy in [SuccessPolicy::FailOpen, SuccessPolicy::Strict] {
            assert!(is_success(policy, &json!({"success": true})));
            assert!(!is_success(policy, &json!({"success": false, "message": "nope"})));
        }
    }

    #[test]
    fn test_missing_flag_depends_on_policy() {
        let plain_array = json!([1, 2, 3]);
        let no_flag = json!({"data": {}});
        let string_flag = json!({"success": "false"});

        assert!(is_success(SuccessPolicy::FailOpen, &plain_array));
        assert!(is_success(SuccessPolicy::FailOpen, &no_flag));
        assert!(is_success(SuccessPolicy::FailOpen, &string_flag));

        assert!(!is_success(SuccessPolicy::Strict, &plain_array));
        assert!(!is_success(SuccessPolicy::Strict, &no_flag));
        assert!(!is_success(SuccessPolicy::Strict, &string_flag));
    }

    #[test]
    fn test_judge_bodies() {
        let policy = SuccessPolicy::FailOpen;
        assert_eq!(judge(policy, br#"{"success":true}"#), Verdict::Success);
        assert_eq!(judge(policy, br#"{"success":false}"#), Verdict::Failure);
        assert_eq!(judge(policy, b"<html></html>"), Verdict::Opaque);
        assert_eq!(judge(policy, b""), Verdict::Opaque);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("strict".parse::<SuccessPolicy>(), Ok(SuccessPolicy::Strict));
        assert_eq!("Fail-Open".parse::<SuccessPolicy>(), Ok(SuccessPolicy::FailOpen));
        assert!("lenient".parse::<SuccessPolicy>().is_err());
    }
}
