//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Build a coordinator or speaker from the context
//! - Format results for the terminal and tear down before returning

pub mod interactive;
pub mod prefetch;
pub mod say;
