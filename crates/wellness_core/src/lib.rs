pub mod cache;
pub mod domain;
pub mod favorites;
pub mod filter;
pub mod gateway;
pub mod ports;
pub mod testing;
pub mod view_state;

pub use cache::SessionCache;
pub use domain::{Category, Session, SessionId, UnknownCategory};
pub use favorites::{FavoriteStore, FAVORITE_IDS_KEY};
pub use filter::SessionFilter;
pub use gateway::SessionGateway;
pub use ports::{PortError, PortResult, PreferenceStore, RemoteSession, SessionSource};
pub use view_state::{
    DetailSnapshot, FavoritesScreen, FavoritesSnapshot, ListSnapshot, SessionDetailScreen,
    SessionListScreen, ViewState,
};
