use crate::config;

/// Load settings, falling back to defaults on any problem.
///
/// The problem is returned so it can be reported once logging is up.
pub fn load_settings() -> (config::Settings, Option<String>) {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                let problem = format!("invalid config, using defaults: {msg}");
                eprintln!("streamsic: {problem}");
                (config::Settings::default(), Some(problem))
            } else {
                (s, None)
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            let problem = format!("failed to load config, using defaults: {e}");
            eprintln!("streamsic: {problem}");
            (config::Settings::default(), Some(problem))
        }
    }
}
