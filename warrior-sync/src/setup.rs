//! Idempotent setup of the destination attribute that carries source ids.

use crate::collaborator::{AttributeDefinition, TaskDestination};
use crate::error::SyncError;

/// Make sure `wanted` exists in the destination.
///
/// Returns whether the attribute is (or, in dry-run, would be) usable. An
/// existing definition of the same kind is left alone, whatever its label.
/// A definition of a different kind is a [`SyncError::Configuration`].
pub fn ensure_attribute(
    destination: &mut dyn TaskDestination,
    wanted: &AttributeDefinition,
    dry_run: bool,
) -> Result<bool, SyncError> {
    match destination.attribute(&wanted.name)? {
        Some(existing) if existing.kind == wanted.kind => {
            tracing::debug!("attribute '{}' already defined", wanted.name);
            Ok(true)
        }
        Some(existing) => Err(SyncError::Configuration(format!(
            "attribute '{}' exists with type '{}', expected '{}'",
            wanted.name,
            existing.kind.map_or("unknown", |k| k.as_str()),
            wanted.kind.map_or("unknown", |k| k.as_str()),
        ))),
        None if dry_run => {
            tracing::info!("[dry-run] would define attribute '{}'", wanted.name);
            Ok(true)
        }
        None => {
            destination.define_attribute(wanted)?;
            let present = destination
                .attribute(&wanted.name)?
                .is_some_and(|def| def.kind == wanted.kind);
            if present {
                tracing::info!("defined attribute '{}'", wanted.name);
            } else {
                tracing::warn!("attribute '{}' not visible after defining it", wanted.name);
            }
            Ok(present)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{AttributeKind, NewTask};
    use crate::error::CollaboratorError;
    use warrior_core::TaskUuid;

    #[derive(Default)]
    struct FakeAttributes {
        current: Option<AttributeDefinition>,
        defines: usize,
    }

    impl TaskDestination for FakeAttributes {
        fn create_task(&mut self, _: &NewTask<'_>) -> Result<TaskUuid, CollaboratorError> {
            unreachable!("setup never creates tasks")
        }

        fn attribute(&self, _: &str) -> Result<Option<AttributeDefinition>, CollaboratorError> {
            Ok(self.current.clone())
        }

        fn define_attribute(&mut self, def: &AttributeDefinition) -> Result<(), CollaboratorError> {
            self.defines += 1;
            self.current = Some(def.clone());
            Ok(())
        }
    }

    fn wanted() -> AttributeDefinition {
        AttributeDefinition::string("reminderid", "Reminder ID")
    }

    #[test]
    fn defines_missing_attribute_once() {
        let mut dest = FakeAttributes::default();
        assert!(ensure_attribute(&mut dest, &wanted(), false).unwrap());
        assert!(ensure_attribute(&mut dest, &wanted(), false).unwrap());
        assert_eq!(dest.defines, 1);
    }

    #[test]
    fn dry_run_reports_present_without_writing() {
        let mut dest = FakeAttributes::default();
        assert!(ensure_attribute(&mut dest, &wanted(), true).unwrap());
        assert_eq!(dest.defines, 0);
        assert!(dest.current.is_none());
    }

    #[test]
    fn compatible_attribute_with_other_label_is_kept() {
        let mut dest = FakeAttributes {
            current: Some(AttributeDefinition::string("reminderid", "Apple id")),
            defines: 0,
        };
        assert!(ensure_attribute(&mut dest, &wanted(), false).unwrap());
        assert_eq!(dest.defines, 0);
    }

    #[test]
    fn incompatible_attribute_is_a_configuration_error() {
        let mut dest = FakeAttributes {
            current: Some(AttributeDefinition {
                name: "reminderid".to_string(),
                kind: Some(AttributeKind::Numeric),
                label: "Reminder ID".to_string(),
            }),
            defines: 0,
        };
        let err = ensure_attribute(&mut dest, &wanted(), false).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)), "got: {err}");
        assert!(err.to_string().contains("numeric"));
        assert_eq!(dest.defines, 0);
    }
}
