//! User settings: a TOML file under the XDG config dir plus
//! `STREAMSIC__SECTION__KEY` environment overrides.

mod load;
mod schema;

pub use load::default_log_path;
pub use schema::*;

#[cfg(test)]
mod tests;
