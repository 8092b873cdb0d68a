//! Catalog ingestion: raw song-catalog JSON into the songs and artists
//! dimension tables.

use datafusion::prelude::*;
use tracing::{info, instrument};

use crate::config::Config;
use crate::constants::{ARTISTS_TABLE, SONGS_TABLE};
use crate::error::Result;
use crate::pipeline::sink;
use crate::schema;

const SONG_COLUMNS: [&str; 5] = ["song_id", "title", "artist_id", "year", "duration"];
const ARTIST_COLUMNS: [&str; 5] = [
    "artist_id",
    "artist_name",
    "artist_location",
    "artist_latitude",
    "artist_longitude",
];

/// Reads the configured catalog slice and persists the songs and artists
/// dimensions. No row transformation happens beyond projection and
/// exact-duplicate elimination.
#[instrument(skip(ctx, config))]
pub async fn run(ctx: &SessionContext, config: &Config) -> Result<()> {
    let source = config.catalog_source();
    info!("Reading catalog records from {}", source);

    let catalog_schema = schema::catalog_schema();
    let options = NdJsonReadOptions::default().schema(&catalog_schema);
    let df = ctx.read_json(source.as_str(), options).await?;

    let songs = df.clone().select_columns(&SONG_COLUMNS)?.distinct()?;
    let song_rows = songs.clone().count().await?;
    sink::write_table(
        ctx,
        songs,
        &config.table_path(SONGS_TABLE),
        &["year", "artist_id"],
        config.etl.write_mode,
    )
    .await?;
    info!("Wrote {} rows to {}", song_rows, SONGS_TABLE);

    let artists = df.select_columns(&ARTIST_COLUMNS)?.distinct()?;
    let artist_rows = artists.clone().count().await?;
    sink::write_table(
        ctx,
        artists,
        &config.table_path(ARTISTS_TABLE),
        &[],
        config.etl.write_mode,
    )
    .await?;
    info!("Wrote {} rows to {}", artist_rows, ARTISTS_TABLE);

    Ok(())
}
