//! `ragguard ask`: authenticate and answer one question in-process.
//!
//! Goes through the same gate and pipeline as `POST /query`, which makes it
//! a convenient smoke test for a config without an HTTP client.

use std::path::Path;

use ragguard_core::query::Query;
use ragguard_security::{AuditEvent, AuditOutcome};

pub async fn run(
    config_path: Option<&Path>,
    username: &str,
    password: &str,
    question: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let state = ragguard_gateway::build_state(&config)?;

    let user = match state.auth.authenticate(username, password) {
        Ok(user) => {
            state
                .audit
                .log(AuditEvent::LoginSucceeded, username, AuditOutcome::Success);
            user
        }
        Err(e) => {
            state
                .audit
                .log(AuditEvent::LoginFailed, username, AuditOutcome::Denied);
            return Err(format!("Login failed: {e}").into());
        }
    };

    let response = state.pipeline.answer(&Query::new(question), &user).await;
    state.audit.log(
        AuditEvent::QueryAnswered {
            sources: response.sources.clone(),
        },
        &user.username,
        AuditOutcome::Success,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Role: {}", response.role);
    println!("\n{}\n", response.answer);
    if response.sources.is_empty() {
        println!("Sources: (none)");
    } else {
        println!("Sources:");
        for source in &response.sources {
            println!("   - {source}");
        }
    }

    Ok(())
}
