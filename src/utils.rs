//! Utility functions shared by the loaders and the dispatcher.

use std::{any::Any, path::Path};

/// File extensions recognised for command and interaction files.
pub const CONFIG_EXTENSIONS: [&str; 3] = ["toml", "yaml", "yml"];

/// Derives the display name of a command from its configuration file path.
///
/// The display name is the file name with a recognised configuration
/// extension stripped. Other extensions are kept as part of the name.
///
/// # Returns
///
/// `None` if the path has no file name or the file name is not valid UTF-8.
///
/// # Examples
///
/// ```
/// # use switchboard::utils::display_name;
/// # use std::path::Path;
/// assert_eq!(display_name(Path::new("commands/ping.toml")), Some("ping".to_string()));
/// assert_eq!(display_name(Path::new("commands/notes.txt")), Some("notes.txt".to_string()));
/// ```
pub fn display_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;

    let stripped = CONFIG_EXTENSIONS
        .iter()
        .find_map(|extension| file_name.strip_suffix(&format!(".{}", extension)))
        .unwrap_or(file_name);

    Some(stripped.to_owned())
}

/// Extracts a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_owned()
}
