// HSE summary routes: look up a ServiceNow record, summarize it, reshape for AgilePoint.
// Every route runs the same pipeline, parameterized by an `Endpoint` profile.

pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
