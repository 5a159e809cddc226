//! The `config` and `init` commands

use log::info;

use crate::config::{TrackerPaths, TrackerSettings};
use crate::error::TrackerResult;

/// Render the configuration paths and effective settings
pub fn format_config(paths: &TrackerPaths, settings: &TrackerSettings) -> String {
    let attributes = if settings.attributes.is_empty() {
        "all".to_string()
    } else {
        settings.attributes.join(", ")
    };
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    let mut output = String::new();
    output.push_str("object-tracker Configuration\n");
    output.push_str("============================\n");
    output.push_str(&format!(
        "Config directory: {}\n",
        paths.base_dir().display()
    ));
    output.push_str(&format!(
        "Settings file:    {}{}\n",
        paths.settings_file().display(),
        if paths.is_initialized() { "" } else { " (not created)" }
    ));
    output.push('\n');
    output.push_str("Settings:\n");
    output.push_str(&format!("  Tracked attributes: {}\n", attributes));
    output.push_str(&format!("  Auto notify:        {}\n", yes_no(settings.auto_notify)));
    output.push_str(&format!("  Stack trace:        {}\n", yes_no(settings.stack_trace)));
    output.push_str(&format!("  Changes only:       {}\n", yes_no(settings.changes_only)));
    output.push_str(&format!("  Tracker attribute:  {}\n", settings.tracker_attribute));
    output
}

/// Handle the `config` command
pub fn handle_config(paths: &TrackerPaths, settings: &TrackerSettings) -> TrackerResult<()> {
    print!("{}", format_config(paths, settings));
    Ok(())
}

/// Handle the `init` command
///
/// Writes default settings unless a settings file exists and `force` is off.
/// Returns whether a file was written.
pub fn handle_init(paths: &TrackerPaths, force: bool) -> TrackerResult<bool> {
    if paths.is_initialized() && !force {
        println!(
            "Already initialized at: {}",
            paths.settings_file().display()
        );
        println!("Use --force to overwrite with defaults.");
        return Ok(false);
    }

    paths.ensure_directories()?;
    TrackerSettings::default().save(&paths.settings_file())?;
    info!("Wrote default settings to {}", paths.settings_file().display());

    println!(
        "Initialized object-tracker at: {}",
        paths.base_dir().display()
    );
    Ok(true)
}
