use std::io::{self, BufRead, Write};

use client_core::UserPrompter;
use tracing::warn;

/// Line-oriented stdin/stdout front end.
pub struct Terminal;

impl Terminal {
    /// Prints `message` and reads one line; `None` on end of input.
    pub fn read_line(&self, message: &str) -> Option<String> {
        print!("{message}");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                warn!(error = %err, "failed to read from stdin");
                None
            }
        }
    }
}

impl UserPrompter for Terminal {
    fn prompt(&self, message: &str) -> Option<String> {
        self.read_line(&format!("{message}\n> "))
    }

    fn notify(&self, message: &str) {
        println!("\n{message}\n");
    }
}
