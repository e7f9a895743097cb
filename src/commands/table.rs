//! The command table and its directory loader.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, error, warn};

use crate::commands::{CommandSpec, ExecutorRegistry, InteractionSpec, LoadError};

/// Lists the files under `root`, descending into subdirectories when `recurse`.
///
/// Returns nothing when `root` is missing, not a directory or unreadable.
/// Files are sorted so that "last registration wins" is deterministic.
/// Symbolic links to directories are never followed.
fn collect_files(root: &Path, recurse: bool) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot read directory '{}': {}", root.display(), e);
            return vec![];
        }
    };

    let mut paths = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_type = entry.file_type().ok()?;
            Some((entry.path(), file_type))
        })
        .collect::<Vec<_>>();
    paths.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut files = vec![];
    for (path, file_type) in paths {
        if file_type.is_dir() {
            if recurse {
                files.extend(collect_files(&path, true));
            } else {
                debug!("skipping subdirectory '{}'", path.display());
            }
        } else if file_type.is_symlink() && path.is_dir() {
            warn!("skipping directory link '{}'", path.display());
        } else {
            files.push(path);
        }
    }

    files
}

/// Maps keywords to text commands and names to interactions.
///
/// Built once, then shared read-only behind an [`Arc`]. Reloading builds a
/// new table instead of mutating a shared one.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Arc<CommandSpec>>,
    interactions: HashMap<String, Arc<InteractionSpec>>,
}

impl CommandTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        CommandTable::default()
    }

    /// Inserts `spec` under each of its calls.
    ///
    /// A call already taken by another command is silently reassigned.
    pub fn insert_command(&mut self, spec: CommandSpec) {
        let spec = Arc::new(spec);
        for call in spec.calls() {
            self.commands.insert(call.clone(), Arc::clone(&spec));
        }
    }

    /// Inserts `spec` under its display name, replacing any previous one.
    pub fn insert_interaction(&mut self, spec: InteractionSpec) {
        self.interactions
            .insert(spec.name().to_owned(), Arc::new(spec));
    }

    /// Moves every entry of `other` into this table.
    ///
    /// Entries of `other` replace the ones already present under the same
    /// keyword or name.
    pub fn merge(&mut self, other: CommandTable) {
        self.commands.extend(other.commands);
        self.interactions.extend(other.interactions);
    }

    /// Returns the text command called by `keyword`.
    pub fn command(&self, keyword: &str) -> Option<&Arc<CommandSpec>> {
        self.commands.get(keyword)
    }

    /// Returns the interaction named `name`.
    pub fn interaction(&self, name: &str) -> Option<&Arc<InteractionSpec>> {
        self.interactions.get(name)
    }

    /// Returns every distinct text command, sorted by display name.
    ///
    /// Specs are told apart by identity, so two files sharing a name in
    /// different directories are both listed.
    pub fn commands(&self) -> Vec<Arc<CommandSpec>> {
        let mut specs = self
            .commands
            .values()
            .map(|spec| (Arc::as_ptr(spec), spec))
            .collect::<HashMap<_, _>>()
            .into_values()
            .cloned()
            .collect::<Vec<_>>();
        specs.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.calls().cmp(b.calls())));
        specs
    }

    /// Returns every interaction, sorted by display name.
    pub fn interactions(&self) -> Vec<Arc<InteractionSpec>> {
        self.interactions
            .iter()
            .collect::<BTreeMap<_, _>>()
            .into_values()
            .cloned()
            .collect()
    }

    /// Loads the command file at `path` into the table.
    pub fn register_command_file(
        &mut self,
        path: &Path,
        registry: &ExecutorRegistry,
    ) -> Result<(), LoadError> {
        let spec = CommandSpec::load(path, registry)?;
        self.insert_command(spec);
        Ok(())
    }

    /// Loads the interaction file at `path` into the table.
    pub fn register_interaction_file(
        &mut self,
        path: &Path,
        registry: &ExecutorRegistry,
    ) -> Result<(), LoadError> {
        let spec = InteractionSpec::load(path, registry)?;
        self.insert_interaction(spec);
        Ok(())
    }

    /// Loads every command file found under `root`.
    ///
    /// Subdirectories are descended into only when `recurse` is `true`. Files
    /// that fail to load are logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of commands loaded.
    pub fn load_commands(
        &mut self,
        root: &Path,
        recurse: bool,
        registry: &ExecutorRegistry,
    ) -> usize {
        let mut loaded = 0;
        for path in collect_files(root, recurse) {
            match self.register_command_file(&path, registry) {
                Ok(()) => loaded += 1,
                Err(e) => error!("failed to load command '{}': {}", path.display(), e),
            }
        }
        loaded
    }

    /// Loads every interaction file found under `root`.
    ///
    /// Same walking rules as [`Self::load_commands`].
    pub fn load_interactions(
        &mut self,
        root: &Path,
        recurse: bool,
        registry: &ExecutorRegistry,
    ) -> usize {
        let mut loaded = 0;
        for path in collect_files(root, recurse) {
            match self.register_interaction_file(&path, registry) {
                Ok(()) => loaded += 1,
                Err(e) => error!("failed to load interaction '{}': {}", path.display(), e),
            }
        }
        loaded
    }
}
