//! Parquet persistence with an explicit rerun policy.

use datafusion::dataframe::{DataFrame, DataFrameWriteOptions};
use datafusion::datasource::listing::ListingTableUrl;
use datafusion::prelude::SessionContext;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::WriteMode;
use crate::error::{EtlError, Result};

/// Persists a DataFrame as a directory of Parquet files under `path`,
/// hive-partitioned by `partition_by` when non-empty.
///
/// Rerun behavior is explicit rather than engine-default: `Overwrite` clears
/// the table prefix first, `Fail` refuses a non-empty prefix, `Append` writes
/// new uniquely-named files alongside whatever is already there.
pub async fn write_table(
    ctx: &SessionContext,
    df: DataFrame,
    path: &str,
    partition_by: &[&str],
    mode: WriteMode,
) -> Result<()> {
    match mode {
        WriteMode::Overwrite => clear_prefix(ctx, path).await?,
        WriteMode::Fail => {
            if !existing_objects(ctx, path).await?.is_empty() {
                return Err(EtlError::DestinationNotEmpty(path.to_string()));
            }
        }
        WriteMode::Append => {}
    }

    let options = DataFrameWriteOptions::new()
        .with_partition_by(partition_by.iter().map(|c| c.to_string()).collect());
    df.write_parquet(path, options, None).await?;
    info!("Wrote table at {}", path);
    Ok(())
}

async fn clear_prefix(ctx: &SessionContext, path: &str) -> Result<()> {
    let (store, prefix) = store_for(ctx, path)?;
    let objects = list_prefix(&store, &prefix).await?;
    for object in &objects {
        store.delete(&object.location).await?;
    }
    if !objects.is_empty() {
        debug!("Cleared {} objects under {}", objects.len(), path);
    }
    Ok(())
}

async fn existing_objects(ctx: &SessionContext, path: &str) -> Result<Vec<ObjectMeta>> {
    let (store, prefix) = store_for(ctx, path)?;
    list_prefix(&store, &prefix).await
}

fn store_for(ctx: &SessionContext, path: &str) -> Result<(Arc<dyn ObjectStore>, ObjectPath)> {
    let url = ListingTableUrl::parse(path)?;
    let store = ctx.runtime_env().object_store(url.object_store())?;
    Ok((store, url.prefix().clone()))
}

async fn list_prefix(store: &Arc<dyn ObjectStore>, prefix: &ObjectPath) -> Result<Vec<ObjectMeta>> {
    // A table that was never written lists as empty, not as an error
    match store.list(Some(prefix)).try_collect().await {
        Ok(objects) => Ok(objects),
        Err(object_store::Error::NotFound { .. }) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
