pub mod prefs;
pub mod remote;

pub use prefs::SqlitePreferences;
pub use remote::HttpSessionSource;
