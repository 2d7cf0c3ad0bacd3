use std::{collections::HashMap, fs};

#[derive(Debug, Default)]
pub struct Settings {
    pub initial_name: Option<String>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("demo.toml") {
        apply_file_settings(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("DEMO__INITIAL_NAME") {
        settings.initial_name = Some(v);
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("initial_name") {
            settings.initial_name = Some(v.clone());
        }
    }
}
