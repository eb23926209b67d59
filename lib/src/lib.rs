//! zbrdf turns zbMATH bibliographic XML into N-Triples and answers SPARQL
//! "problems" over the resulting graph.
//!
//! The conversion path is [`parser`] -> [`record`] -> [`triples`] -> [`buffer`],
//! driven by [`convert`]. [`split`] cuts large outputs into loadable parts.
//! The query path is [`problem`] -> [`query`] -> [`endpoint`] -> [`solution`],
//! driven by [`runner`].

extern crate derive_builder;

pub mod buffer;
pub mod config;
pub mod consts;
pub mod convert;
pub mod endpoint;
pub mod errors;
pub mod parser;
pub mod problem;
pub mod query;
pub mod record;
pub mod runner;
pub mod solution;
pub mod split;
pub mod triples;

pub use config::Config;
pub use convert::{convert_file, ConversionReport};
pub use runner::{solve_file, RunReport};
pub use split::split_file;

/// Initializes logging for the zbrdf library.
///
/// If `ZBRDF_LOG` is set, `RUST_LOG` is set to its value, so `ZBRDF_LOG` takes
/// precedence. The logger itself (e.g. `env_logger`) must be initialized after
/// this call for the level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("ZBRDF_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}
