use sentry::protocol::Event;
use sentry::types::{random_uuid, Dsn};
use sentry::{ClientInitGuard, Level};
use std::error::Error;

/// Reports a failed invocation to sentry.
///
/// Only the failure reason and the error chain are sent, callers must make
/// sure neither contains key material or issued tokens.
pub fn report_failure(failure_reason: &str, error: &dyn Error) {
    if sentry::Hub::current().client().is_none() {
        log::debug!("report_failure: No client found");
        return;
    }

    let mut message = format!("{failure_reason}: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }

    let event = Event {
        event_id: random_uuid(),
        message: Some(message),
        level: Level::Error,
        ..Default::default()
    };

    sentry::capture_event(event);
}

pub fn init_sentry(dsn: Option<String>) -> Option<ClientInitGuard> {
    let dsn = match dsn {
        Some(dsn) if !dsn.is_empty() => dsn,
        _ => {
            log::warn!("init_sentry: No DSN provided");
            return None;
        }
    };
    let dsn: Dsn = match dsn.parse() {
        Ok(dsn) => dsn,
        Err(e) => {
            log::warn!("init_sentry: Invalid DSN, error reporting disabled: {e}");
            return None;
        }
    };
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
