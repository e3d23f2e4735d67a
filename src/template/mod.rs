//! Template resolution for specimen text.
//!
//! Intent, code, and test expressions may reference placeholders written as
//! `{{ name }}`. A name resolves either to a fixed alias from the
//! [`AliasTable`] or to a value sampled from one of the specimen's
//! [`RandomBinding`]s. One sample is taken per verification pass and reused for
//! every piece of text, so the `x` in the intent is the `x` in the assertions.
//!
//! # Example
//!
//! ```ignore
//! use specimen_forge::generator::ValueSampler;
//! use specimen_forge::template::{parse_binding, render, sample, AliasTable, TemplateNamespace};
//!
//! let bindings = vec![parse_binding("n = @RNAT")?];
//! let sampled = sample(&bindings, &mut ValueSampler::new(3))?;
//! let ns = TemplateNamespace::merge(&AliasTable::default(), &sampled);
//! let code = render("def foo():\n    return {{ n }}", &ns)?;
//! ```

pub mod binding;
pub mod namespace;
pub mod render;

pub use binding::{parse_binding, sample, RandomBinding};
pub use namespace::{AliasTable, SampledValues, TemplateNamespace};
pub use render::render;
