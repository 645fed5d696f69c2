//! Subtype resolution for polymorphic definitions.

use jsg_core::TypeDescriptor;

use crate::context::SchemaGenerationContext;

/// Finds the concrete subtypes a declared type stands for.
pub trait SubtypeResolver: Send + Sync {
    /// `Ok(None)` or an empty list means "treat the type as concrete".
    ///
    /// # Errors
    ///
    /// Any error aborts the generation run unchanged.
    fn find_subtypes(
        &self,
        ty: &TypeDescriptor,
        context: &SchemaGenerationContext,
    ) -> anyhow::Result<Option<Vec<TypeDescriptor>>>;

    fn reset_for_new_run(&self) {}
}

pub(crate) struct FnSubtypeResolver<F>(pub(crate) F);

impl<F> SubtypeResolver for FnSubtypeResolver<F>
where
    F: Fn(&TypeDescriptor, &SchemaGenerationContext) -> anyhow::Result<Option<Vec<TypeDescriptor>>>
        + Send
        + Sync,
{
    fn find_subtypes(
        &self,
        ty: &TypeDescriptor,
        context: &SchemaGenerationContext,
    ) -> anyhow::Result<Option<Vec<TypeDescriptor>>> {
        (self.0)(ty, context)
    }
}

/// Lists the declared direct subtypes of abstract classes and interfaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredSubtypeResolver;

impl SubtypeResolver for DeclaredSubtypeResolver {
    fn find_subtypes(
        &self,
        ty: &TypeDescriptor,
        context: &SchemaGenerationContext,
    ) -> anyhow::Result<Option<Vec<TypeDescriptor>>> {
        let types = context.type_context();
        let Some(declaration) = types.declaration(ty) else {
            return Ok(None);
        };
        if !declaration.is_abstract_or_interface() {
            return Ok(None);
        }
        let subtypes = types.known_subtypes(ty)?;
        if subtypes.is_empty() {
            return Ok(None);
        }
        tracing::debug!(r#type = %ty, count = subtypes.len(), "declared subtypes found");
        Ok(Some(subtypes))
    }
}
