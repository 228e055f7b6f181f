use tracing::info;

use crate::error::CimspecError;
use crate::model::Specialization;
use crate::traversal::{SpecializationVisitor, walk};

/// Shared surface of the output generators.
///
/// A generator is constructed over one specialization, driven by [`walk`], then asked for
/// its serialized output. Fragment caches are scoped to a single run: `generate` resets
/// them first, so running twice yields identical output.
pub trait Generator<'a>: SpecializationVisitor {
    /// Short name used in logs.
    const FORMAT: &'static str;

    fn specialization(&self) -> &'a Specialization;

    /// Drops every fragment produced by a previous run.
    fn reset(&mut self);

    fn get_output(&self) -> Result<String, CimspecError>;

    fn generate(&mut self) -> Result<String, CimspecError>
    where
        Self: Sized,
    {
        let spec = self.specialization();
        self.reset();
        walk(spec, self)?;
        let output = self.get_output()?;
        info!(
            format = Self::FORMAT,
            nodes = spec.len(),
            bytes = output.len(),
            "generated specialization output"
        );
        Ok(output)
    }
}
