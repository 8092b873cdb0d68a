//! Event ingestion: raw activity-log JSON into the users and time dimension
//! tables and the songplays fact table.

use datafusion::arrow::datatypes::DataType;
use datafusion::common::JoinType;
use datafusion::functions::expr_fn::{date_part, to_timestamp_seconds, uuid};
use datafusion::logical_expr::expr_fn::cast;
use datafusion::prelude::*;
use tracing::{info, instrument};

use crate::config::Config;
use crate::constants::{ARTISTS_TABLE, SONGPLAYS_TABLE, SONGS_TABLE, SONG_PLAY_PAGE, TIME_TABLE, USERS_TABLE};
use crate::error::Result;
use crate::pipeline::sink;
use crate::schema;

/// Reads the configured activity-log slice, keeps song-play events only, and
/// persists the users and time dimensions plus the songplays fact table.
///
/// Requires the songs table to already exist at the destination: the
/// enrichment join reads it back from there, not from the catalog stage's
/// in-memory frame.
#[instrument(skip(ctx, config))]
pub async fn run(ctx: &SessionContext, config: &Config) -> Result<()> {
    let source = config.events_source();
    info!("Reading activity records from {}", source);

    let activity_schema = schema::activity_schema();
    let options = NdJsonReadOptions::default().schema(&activity_schema);
    let df = ctx.read_json(source.as_str(), options).await?;

    // Only song-play events feed the star schema
    let plays = df.filter(col("page").eq(lit(SONG_PLAY_PAGE)))?;

    write_users(ctx, config, plays.clone()).await?;

    // ts is a millisecond epoch; integer division truncates to whole seconds (UTC)
    let plays = plays.with_column("start_time", to_timestamp_seconds(vec![col("ts") / lit(1000)]))?;

    let time = time_dimension(plays.clone())?;
    let time_rows = time.clone().count().await?;
    sink::write_table(
        ctx,
        time.clone(),
        &config.table_path(TIME_TABLE),
        &["year", "month"],
        config.etl.write_mode,
    )
    .await?;
    info!("Wrote {} rows to {}", time_rows, TIME_TABLE);

    write_songplays(ctx, config, plays, time).await?;

    Ok(())
}

async fn write_users(ctx: &SessionContext, config: &Config, plays: DataFrame) -> Result<()> {
    let users = plays
        .select(vec![
            ident("userId").alias("user_id"),
            ident("firstName").alias("first_name"),
            ident("lastName").alias("last_name"),
            col("gender"),
            col("level"),
        ])?
        .distinct()?;
    let user_rows = users.clone().count().await?;
    sink::write_table(
        ctx,
        users,
        &config.table_path(USERS_TABLE),
        &[],
        config.etl.write_mode,
    )
    .await?;
    info!("Wrote {} rows to {}", user_rows, USERS_TABLE);
    Ok(())
}

/// Calendar breakdown of every distinct play timestamp. `weekday` follows the
/// engine's `dow` numbering: 0 = Sunday through 6 = Saturday.
fn time_dimension(plays: DataFrame) -> Result<DataFrame> {
    let part = |name: &str| cast(date_part(lit(name), col("start_time")), DataType::Int32);
    let time = plays
        .select(vec![
            col("start_time"),
            part("hour").alias("hour"),
            part("day").alias("day"),
            part("week").alias("week"),
            part("month").alias("month"),
            part("year").alias("year"),
            part("dow").alias("weekday"),
            col("ts"),
        ])?
        .distinct()?;
    Ok(time)
}

async fn write_songplays(
    ctx: &SessionContext,
    config: &Config,
    plays: DataFrame,
    time: DataFrame,
) -> Result<()> {
    let catalog = read_song_catalog(ctx, config).await?;

    // Title-only matching is the compatible default; match_artist trades that
    // compatibility for fewer ambiguous matches on reused titles
    let mut keys = vec![col("song").eq(col("title"))];
    if config.etl.match_artist {
        keys.push(col("artist").eq(col("artist_name")));
    }

    // Left join: activity rows with no catalog match survive with null
    // song_id/artist_id
    let enriched = plays.join_on(catalog, JoinType::Left, keys)?.select(vec![
        uuid().alias("songplay_id"),
        col("start_time").alias("st"),
        ident("userId").alias("user_id"),
        col("level"),
        col("song_id"),
        col("artist_id"),
        ident("sessionId").alias("session_id"),
        col("location"),
        ident("userAgent").alias("user_agent"),
    ])?;

    // Recover (year, month) for partitioning from the time dimension
    let songplays = enriched
        .join_on(time, JoinType::Left, [col("st").eq(col("start_time"))])?
        .select(vec![
            col("songplay_id"),
            col("start_time"),
            col("user_id"),
            col("level"),
            col("song_id"),
            col("artist_id"),
            col("session_id"),
            col("location"),
            col("user_agent"),
            col("year"),
            col("month"),
        ])?;

    let songplay_rows = songplays.clone().count().await?;
    sink::write_table(
        ctx,
        songplays,
        &config.table_path(SONGPLAYS_TABLE),
        &["year", "month"],
        config.etl.write_mode,
    )
    .await?;
    info!("Wrote {} rows to {}", songplay_rows, SONGPLAYS_TABLE);
    Ok(())
}

/// Reads the songs table back from the destination. With `match_artist` the
/// artists table is folded in so the join can see artist names, which the
/// songs table does not carry.
async fn read_song_catalog(ctx: &SessionContext, config: &Config) -> Result<DataFrame> {
    let songs_path = config.table_path(SONGS_TABLE);
    let songs = ctx
        .read_parquet(
            songs_path.as_str(),
            ParquetReadOptions::default().table_partition_cols(vec![
                ("year".to_string(), DataType::Int32),
                ("artist_id".to_string(), DataType::Utf8),
            ]),
        )
        .await?
        .select(vec![col("song_id"), col("title"), col("artist_id")])?;

    if !config.etl.match_artist {
        return Ok(songs);
    }

    let artists_path = config.table_path(ARTISTS_TABLE);
    let artists = ctx
        .read_parquet(artists_path.as_str(), ParquetReadOptions::default())
        .await?
        .select(vec![col("artist_id").alias("aid"), col("artist_name")])?;

    let catalog = songs
        .join_on(artists, JoinType::Inner, [col("artist_id").eq(col("aid"))])?
        .select(vec![
            col("song_id"),
            col("title"),
            col("artist_id"),
            col("artist_name"),
        ])?;
    Ok(catalog)
}
