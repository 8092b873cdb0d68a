/// Table name constants to keep destination sub-paths consistent across the
/// codebase. Each table is written as a directory of Parquet files under the
/// destination base location.
pub const SONGS_TABLE: &str = "songs_table";
pub const ARTISTS_TABLE: &str = "artists_table";
pub const USERS_TABLE: &str = "users_table";
pub const TIME_TABLE: &str = "time_table";
pub const SONGPLAYS_TABLE: &str = "songplays_table";

/// Value of the `page` discriminator that marks a song-play event in the
/// activity log. Every other event type is dropped from the pipeline.
pub const SONG_PLAY_PAGE: &str = "NextSong";

// Default source globs. These scope which slice of each dataset is read and
// can be overridden in the [sources] config section.
pub const DEFAULT_CATALOG_GLOB: &str = "song_data/A/A/A/*.json";
pub const DEFAULT_EVENTS_GLOB: &str = "log_data/2018/11/*.json";

/// Sub-paths written under the destination base, in write order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        SONGS_TABLE,
        ARTISTS_TABLE,
        USERS_TABLE,
        TIME_TABLE,
        SONGPLAYS_TABLE,
    ]
}
