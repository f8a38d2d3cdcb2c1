pub mod card_extractor;
pub mod listing_walker;
pub mod media_cache;
pub mod profile_enricher;
pub mod publication_search;
pub mod reconciler;
pub mod rules;

pub use card_extractor::CardExtractor;
pub use listing_walker::{ListingPage, ListingWalker};
pub use media_cache::{cache_filename, CachedImage, MediaCache};
pub use profile_enricher::ProfileEnricher;
pub use publication_search::PublicationSearch;
pub use reconciler::Reconciler;
