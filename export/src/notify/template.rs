//! Subject and body rendering for mail notifications.

use crate::notify::base::{RunFailure, RunInfo};

/// Environment variable holding an external job reference key.
///
/// When set, the key is rendered into notification bodies so recipients can
/// correlate mails with the scheduling system that launched the run.
pub const JOB_KEY_ENV: &str = "EXPORT_JOB_KEY";

fn job_reference() -> String {
    match std::env::var(JOB_KEY_ENV) {
        Ok(key) if !key.is_empty() => format!("\nJob reference: {key}"),
        _ => String::new(),
    }
}

pub fn start_subject(client_name: &str, run: &RunInfo) -> String {
    format!("[{client_name}] Export `{}` started", run.job_name)
}

pub fn start_body(client_name: &str, run: &RunInfo) -> String {
    format!(
        "Hello,\n\n\
         The export `{}` for {client_name} has started (pipeline {}).{}\n\n\
         You will receive another mail once it completes.",
        run.job_name,
        run.pipeline_id,
        job_reference()
    )
}

pub fn complete_subject(client_name: &str, run: &RunInfo) -> String {
    format!("[{client_name}] Export `{}` completed", run.job_name)
}

pub fn complete_body(client_name: &str, run: &RunInfo, items_count: u64) -> String {
    format!(
        "Hello,\n\n\
         The export `{}` for {client_name} has completed (pipeline {}).\n\
         Records exported: {items_count}.{}",
        run.job_name,
        run.pipeline_id,
        job_reference()
    )
}

pub fn failure_subject(client_name: &str, run: &RunInfo) -> String {
    format!("[{client_name}] Export `{}` FAILED", run.job_name)
}

pub fn failure_body(client_name: &str, run: &RunInfo, failure: &RunFailure) -> String {
    let backtrace = match &failure.backtrace {
        Some(backtrace) => format!("\n\nBacktrace:\n{backtrace}"),
        None => String::new(),
    };

    format!(
        "Hello,\n\n\
         The export `{}` for {client_name} has failed (pipeline {}).{}\n\n\
         Error:\n{}{backtrace}\n\n\
         Configuration:\n{}",
        run.job_name,
        run.pipeline_id,
        job_reference(),
        failure.message,
        serde_json::to_string_pretty(&failure.config_snapshot)
            .unwrap_or_else(|_| failure.config_snapshot.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run() -> RunInfo {
        RunInfo {
            pipeline_id: 7,
            job_name: "orders".to_string(),
        }
    }

    #[test]
    fn subjects_carry_client_and_job_names() {
        assert_eq!(
            start_subject("Acme", &run()),
            "[Acme] Export `orders` started"
        );
        assert_eq!(
            failure_subject("Acme", &run()),
            "[Acme] Export `orders` FAILED"
        );
    }

    #[test]
    fn complete_body_reports_items_count() {
        let body = complete_body("Acme", &run(), 42);
        assert!(body.contains("Records exported: 42."));
    }

    #[test]
    fn failure_body_includes_error_and_config() {
        let failure = RunFailure {
            message: "delivery failed".to_string(),
            backtrace: Some("0: export::writer::flush".to_string()),
            config_snapshot: json!({ "batch_size": 1000 }),
        };

        let body = failure_body("Acme", &run(), &failure);
        assert!(body.contains("delivery failed"));
        assert!(body.contains("Backtrace:\n0: export::writer::flush"));
        assert!(body.contains("\"batch_size\": 1000"));
    }
}
