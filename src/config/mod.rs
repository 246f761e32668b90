pub mod settings;

pub use settings::{
    Config,
    FileOutputConfig,
    OutputConfig,
    MIN_UPDATE_INTERVAL_SECONDS,
};
