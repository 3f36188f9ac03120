//! Debug logging gated on [`DebugOptions`]

use crate::types::DebugOptions;

/// Log a message if debugging is enabled
pub fn log(options: &Option<DebugOptions>, message: &str, data: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled {
            log::debug!("{message}: {data}");
        }
    }
}

/// Log request details if request logging is enabled
pub fn log_request(options: &Option<DebugOptions>, message: &str, data: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled && debug_opts.log_requests {
            log::debug!("REQUEST: {message}: {data}");
        }
    }
}

/// Log response details if response logging is enabled
pub fn log_response(options: &Option<DebugOptions>, message: &str) {
    if let Some(debug_opts) = options {
        if debug_opts.enabled && debug_opts.log_responses {
            log::debug!("RESPONSE: {message}");
        }
    }
}

/// Create default debug options with all logging enabled
pub fn debug_all() -> DebugOptions {
    DebugOptions {
        enabled: true,
        log_requests: true,
        log_responses: true,
    }
}
