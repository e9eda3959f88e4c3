//! Hierarchical resource names used by the gRPC and REST bindings.
//!
//! Tasks are addressed as `tasks/{task_id}` and push notification configs
//! as `tasks/{task_id}/pushNotificationConfigs/{config_id}`. Parsing is
//! strict: wrong collection labels, missing segments, or empty IDs are
//! rejected, and the error message carries the offending input verbatim.

use crate::error::{A2AError, A2AResult};

const TASKS: &str = "tasks";
const PUSH_CONFIGS: &str = "pushNotificationConfigs";

/// Format a task resource name: `tasks/{task_id}`.
pub fn task_name(task_id: &str) -> String {
    format!("{}/{}", TASKS, task_id)
}

/// Parse a task resource name back into a task ID.
pub fn parse_task_name(name: &str) -> A2AResult<String> {
    let mut segments = name.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(TASKS), Some(id), None) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(A2AError::invalid_params(format!(
            "invalid task resource name '{}': expected tasks/{{task_id}}",
            name
        ))),
    }
}

/// Format a push config resource name:
/// `tasks/{task_id}/pushNotificationConfigs/{config_id}`.
pub fn push_config_name(task_id: &str, config_id: &str) -> String {
    format!("{}/{}/{}/{}", TASKS, task_id, PUSH_CONFIGS, config_id)
}

/// Parse a push config resource name into `(task_id, config_id)`.
pub fn parse_push_config_name(name: &str) -> A2AResult<(String, String)> {
    let mut segments = name.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(TASKS), Some(task_id), Some(PUSH_CONFIGS), Some(config_id), None)
            if !task_id.is_empty() && !config_id.is_empty() =>
        {
            Ok((task_id.to_string(), config_id.to_string()))
        }
        _ => Err(A2AError::invalid_params(format!(
            "invalid push notification config resource name '{}': \
             expected tasks/{{task_id}}/pushNotificationConfigs/{{config_id}}",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_name_round_trips() {
        let name = task_name("t1");
        assert_eq!(name, "tasks/t1");
        assert_eq!(parse_task_name(&name).unwrap(), "t1");
    }

    #[test]
    fn push_config_name_round_trips() {
        let name = push_config_name("t1", "c1");
        assert_eq!(name, "tasks/t1/pushNotificationConfigs/c1");
        assert_eq!(
            parse_push_config_name(&name).unwrap(),
            ("t1".to_string(), "c1".to_string())
        );
    }

    #[test]
    fn parse_rejects_wrong_collection() {
        assert!(parse_task_name("jobs/t1").is_err());
        assert!(parse_push_config_name("tasks/t1/pushConfigs/c1").is_err());
    }

    #[test]
    fn parse_rejects_missing_or_extra_segments() {
        assert!(parse_task_name("tasks").is_err());
        assert!(parse_task_name("tasks/t1/extra").is_err());
        assert!(parse_push_config_name("tasks/t1/pushNotificationConfigs").is_err());
        assert!(parse_push_config_name("tasks/t1/pushNotificationConfigs/c1/x").is_err());
    }

    #[test]
    fn parse_rejects_empty_ids() {
        assert!(parse_task_name("tasks/").is_err());
        assert!(parse_push_config_name("tasks//pushNotificationConfigs/c1").is_err());
    }

    #[test]
    fn parse_error_names_the_input() {
        let err = parse_task_name("bogus").unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }
}
