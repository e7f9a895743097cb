//! Command and interaction specs built from configuration files.

use std::{fmt, path::Path, sync::Arc};

use log::{error, info, warn};

use crate::{
    commands::{
        CommandExecutor, ExecutorRegistry, InteractionExecutor, LoadError, ParameterSpec,
        document::{CommandDocument, InteractionDocument, read_document},
        parameter::parse_parameters,
    },
    permissions::{PermissionSet, parse_permissions},
    utils::display_name,
};

/// Derives and validates the display name of a command file.
fn command_name(path: &Path) -> Result<String, LoadError> {
    let name =
        display_name(path).ok_or_else(|| LoadError::InvalidFileName(path.to_path_buf()))?;

    if name.chars().any(char::is_whitespace) {
        return Err(LoadError::NameWithSpaces(name));
    }

    Ok(name)
}

/// Resolves an executor reference, logging why it stays unresolved.
fn resolve<T: ?Sized>(
    kind: &str,
    name: &str,
    id: Option<&str>,
    resolver: impl FnOnce(&str) -> Result<Arc<T>, LoadError>,
) -> Option<Arc<T>> {
    let Some(id) = id else {
        error!("loading {} '{}' failed: no executor declared", kind, name);
        return None;
    };

    match resolver(id) {
        Ok(executor) => Some(executor),
        Err(e) => {
            error!("loading {} '{}' failed: {}", kind, name, e);
            None
        }
    }
}

/// A text command, called by a prefixed keyword.
pub struct CommandSpec {
    name: String,
    description: String,
    calls: Vec<String>,
    permissions: PermissionSet,
    executor: Option<Arc<dyn CommandExecutor>>,
}

impl CommandSpec {
    /// Loads the command described by the file at `path`.
    ///
    /// The executor is resolved from `registry`. A resolution failure is
    /// logged and leaves the spec without executor, it is not an error.
    ///
    /// # Errors
    ///
    /// Fails when the file name contains spaces, when the document cannot be
    /// read, or when it declares no call.
    pub fn load(path: &Path, registry: &ExecutorRegistry) -> Result<Self, LoadError> {
        info!("loading command from file '{}'", path.display());
        let name = command_name(path)?;
        let document: CommandDocument = read_document(path)?;
        Self::from_document(name, document, registry)
    }

    /// Builds the command `name` from an already read document.
    pub fn from_document(
        name: String,
        document: CommandDocument,
        registry: &ExecutorRegistry,
    ) -> Result<Self, LoadError> {
        if document.calls.is_empty() {
            return Err(LoadError::NoCalls(name));
        }

        let permissions = parse_permissions(&name, &document.permissions.unwrap_or_default());
        let executor = resolve("command", &name, document.executor.as_deref(), |id| {
            registry.resolve_command(id)
        });

        if executor.is_some() {
            info!("command '{}' loaded successfully", name);
        }

        Ok(CommandSpec {
            name,
            description: document.description,
            calls: document.calls,
            permissions,
            executor,
        })
    }

    /// Display name, derived from the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Keywords calling the command.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Permissions a member needs to call the command.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Bound executor, `None` when it could not be resolved.
    pub fn executor(&self) -> Option<&Arc<dyn CommandExecutor>> {
        self.executor.as_ref()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("calls", &self.calls)
            .field("permissions", &self.permissions)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}

/// A structured interaction command.
pub struct InteractionSpec {
    name: String,
    description: String,
    permissions: PermissionSet,
    parameters: Vec<ParameterSpec>,
    executor: Option<Arc<dyn InteractionExecutor>>,
}

impl InteractionSpec {
    /// Loads the interaction described by the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file name contains spaces, when the document cannot be
    /// read, or when its parameters are invalid. An invalid parameter rejects
    /// the whole interaction.
    pub fn load(path: &Path, registry: &ExecutorRegistry) -> Result<Self, LoadError> {
        info!("loading interaction from file '{}'", path.display());
        let name = command_name(path)?;
        let document: InteractionDocument = read_document(path)?;
        Self::from_document(name, document, registry)
    }

    /// Builds the interaction `name` from an already read document.
    pub fn from_document(
        name: String,
        document: InteractionDocument,
        registry: &ExecutorRegistry,
    ) -> Result<Self, LoadError> {
        let parameters = parse_parameters(&name, document.parameter, document.parameters)?;

        let permissions = match document.permissions {
            Some(permissions) => parse_permissions(&name, &permissions),
            None => {
                warn!(
                    "permissions of interaction '{}' are not set, using default empty permissions",
                    name
                );
                PermissionSet::new()
            }
        };

        let executor = resolve("interaction", &name, document.executor.as_deref(), |id| {
            registry.resolve_interaction(id)
        });

        if executor.is_some() {
            info!("interaction '{}' loaded successfully", name);
        }

        Ok(InteractionSpec {
            name,
            description: document.description,
            permissions,
            parameters,
            executor,
        })
    }

    /// Display name, derived from the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Permissions a member needs to invoke the interaction.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Parameters, in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Bound executor, `None` when it could not be resolved.
    pub fn executor(&self) -> Option<&Arc<dyn InteractionExecutor>> {
        self.executor.as_ref()
    }
}

impl fmt::Debug for InteractionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("permissions", &self.permissions)
            .field("parameters", &self.parameters)
            .field("executor", &self.executor.is_some())
            .finish()
    }
}
