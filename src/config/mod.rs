mod settings;

pub use settings::{
    MattermostConfig, ServerConfig, Settings, SlackConfig, load_settings, settings_from,
};
