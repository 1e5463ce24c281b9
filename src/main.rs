#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};
use std::panic::AssertUnwindSafe;

use birkenbihl_core::config::Settings;
use birkenbihl_core::logging;
use birkenbihl_core::protocol::Core;
use tracing::error;

fn main() {
    logging::init();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "config rejected");
            std::process::exit(1);
        }
    };

    let core = match Core::from_settings(&settings) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "core failed to start");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| core.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
