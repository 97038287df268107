//! Extraction steps, run in a fixed order over one [`DocumentContext`].
//!
//! Later steps read what earlier ones registered: entities skip spans annotated as
//! timexes, coordination and coreference pick the best mention per token, and roles
//! look up predicate mentions by source id.

pub mod coordination;
pub mod coreference;
pub mod entities;
pub mod instances;
pub mod metadata;
pub mod predicates;
pub mod roles;
pub mod timex;

use crate::context::DocumentContext;

/// Run every annotation step in order. Instance projection is left to the caller.
pub fn run_all(ctx: &mut DocumentContext<'_>) {
    metadata::run(ctx);
    timex::run(ctx);
    entities::run(ctx);
    predicates::run(ctx);
    coordination::run(ctx);
    coreference::run(ctx);
    roles::run(ctx);
}
