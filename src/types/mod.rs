// ABOUTME: Validated domain types shared across the orchestrator.
// ABOUTME: Service names, image references, revisions, and redacted secrets.

mod image_ref;
mod revision;
mod secret;
mod service_name;

pub use image_ref::{ImageRef, ParseImageRefError, validate_tag};
pub use revision::Revision;
pub use secret::Secret;
pub use service_name::{ServiceName, ServiceNameError};
