//! Token metadata: the JSON document, the content store it may be uploaded
//! to, and the resolver that turns it into a URI no longer than the
//! on-chain field allows.

mod document;
mod resolver;
mod store;

pub use document::{canonical_image_url, MetadataDocument};
pub use resolver::{degradation_chain, DegradationStep, MetadataUriResolver, UriMode, MAX_URI_LEN};
pub use store::{ContentStore, PinataStore, StoredFile};
