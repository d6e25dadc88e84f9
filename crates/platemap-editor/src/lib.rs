//! Restaurant location editor.
//!
//! Three input channels converge on one [`PositionStore`]: debounced
//! address search ([`SuggestionSearch`]), map gestures resolved back to an
//! address ([`MapInteractionAdapter`] + [`ReverseResolver`]), and suggestion
//! selection. Out-of-order network answers are reconciled by ticket
//! comparison at arrival time. [`ProfilePersistence`] commits the result in
//! two sequential steps.

pub mod backend;
pub mod bootstrap;
pub mod editor;
pub mod geocoder;
pub mod id_cache;
pub mod map;
pub mod persistence;
pub mod resolver;
pub mod search;
pub mod store;

pub use backend::RestaurantBackend;
pub use bootstrap::{BootstrapError, RestaurantIdResolver};
pub use editor::{EditorDeps, ProfileEditor};
pub use geocoder::{ForwardGeocoder, ReverseGeocoder};
pub use id_cache::{FileIdCache, IdCache, MemoryIdCache};
pub use map::MapInteractionAdapter;
pub use persistence::{PersistError, ProfilePersistence, SaveStep};
pub use resolver::{ResolveOutcome, ReverseResolver};
pub use search::{SearchOutcome, SuggestionSearch};
pub use store::{LocationState, PositionStore, ResolveTicket, SearchTicket};
