//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Kingdom Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[presence]
# enabled = true
# collection = "activeCountries"
# ttl_secs = 300              # 10-86400, entries older than this are ignored
# sweep_interval_secs = 30    # 1-3600

[realtime]
# Leave project_ref empty to run with an in-process store.
# project_ref = ""
# api_key = ""
# heartbeat_interval = 25     # 5-120
# reconnect_delay = 1         # 1-60
# max_reconnect_delay = 30    # 1-600

[sequencer]
# transition_delay_ms = 300   # 0-5000
# restart_policy = "preserve" # preserve, reshuffle
# shuffle_seed = 42

[records]
# path = "data/prayerData.json"
# asset_dir = "public/partners"
# fallback_image = "worldmap.png"

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
