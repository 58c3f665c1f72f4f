use std::sync::Arc;

use apex_core::constants::ASSETS_TABLE;
use apex_core::errors::{Error, RepositoryError};
use apex_core::feed::ChangeKind;
use apex_core::{Asset, AssetRepositoryTrait, NewAsset, Result};
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use uuid::Uuid;

use super::model::AssetDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::notifications::ChangeNotifier;
use crate::schema::assets;

/// SQLite-backed asset store.
///
/// Reads go through the pool, writes through the single writer. Every
/// committed write is announced on the `ChangeNotifier`.
pub struct AssetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    notifier: ChangeNotifier,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle, notifier: ChangeNotifier) -> Self {
        AssetRepository {
            pool,
            writer,
            notifier,
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    fn list_all_impl(&self) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = assets::table
            .order((assets::created_at.desc(), assets::id.desc()))
            .select(AssetDB::as_select())
            .load::<AssetDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(|row| Asset::try_from(row).map_err(Error::from))
            .collect()
    }
}

fn not_found(asset_id: &str) -> Error {
    RepositoryError::NotFound(format!("Asset {} not found", asset_id)).into()
}

#[async_trait]
impl AssetRepositoryTrait for AssetRepository {
    async fn list_all(&self) -> Result<Vec<Asset>> {
        self.list_all_impl()
    }

    async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let created = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let asset = new_asset.into_asset(Uuid::new_v4().to_string(), Utc::now());
                let row = AssetDB::from(asset);

                let stored = diesel::insert_into(assets::table)
                    .values(&row)
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Asset::try_from(stored)?)
            })
            .await?;

        debug!("Inserted asset {}", created.id);
        self.notifier
            .publish(ASSETS_TABLE, ChangeKind::Insert, &created.id);
        Ok(created)
    }

    async fn update(&self, asset: Asset) -> Result<Asset> {
        let updated = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Asset> {
                let existing = assets::table
                    .find(&asset.id)
                    .select(AssetDB::as_select())
                    .first::<AssetDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| not_found(&asset.id))?;

                let mut row = AssetDB::from(asset);
                row.created_at = existing.created_at;
                row.updated_at = Utc::now().naive_utc().max(existing.updated_at);

                let stored = diesel::update(assets::table.find(&row.id))
                    .set(&row)
                    .returning(AssetDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Asset::try_from(stored)?)
            })
            .await?;

        debug!("Updated asset {}", updated.id);
        self.notifier
            .publish(ASSETS_TABLE, ChangeKind::Update, &updated.id);
        Ok(updated)
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        let id_owned = asset_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::delete(assets::table.find(&id_owned))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(not_found(&id_owned));
                }
                Ok(())
            })
            .await?;

        debug!("Deleted asset {}", asset_id);
        self.notifier
            .publish(ASSETS_TABLE, ChangeKind::Delete, asset_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use apex_core::feed::ChangeSource;
    use chrono::{DateTime, Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::broadcast::error::TryRecvError;

    fn setup() -> (TempDir, AssetRepository) {
        let dir = tempdir().unwrap();
        let db_file = dir.path().join("nested").join("apex.db");
        let db_path = init(db_file.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer((*pool).clone());
        (dir, AssetRepository::new(pool, writer, ChangeNotifier::new()))
    }

    fn acquired() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 11, 3, 10, 15, 0).unwrap()
    }

    fn draft(name: &str) -> NewAsset {
        NewAsset {
            name: name.to_string(),
            image_url: "https://img.example/coin.png".to_string(),
            acquisition_date: acquired(),
            purchase_price: dec!(1000.50),
            current_value: dec!(1200),
            roi: Decimal::ZERO,
            description: Some("Carson City".to_string()),
            grade: Some("MS-63".to_string()),
            mint: Some("CC".to_string()),
            year: Some(1883),
            is_sold: false,
            sold_price: None,
            sold_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list_includes_exactly_the_draft() {
        let (_dir, repo) = setup();
        let new_asset = draft("Morgan Dollar 1883-CC");

        let created = repo.create(new_asset.clone()).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.created_at, created.updated_at);

        let listed = repo.list_all().await.unwrap();
        let matches: Vec<&Asset> = listed.iter().filter(|a| a.id == created.id).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(
            *matches[0],
            new_asset.into_asset(created.id.clone(), created.created_at)
        );
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let (_dir, repo) = setup();
        let first = repo.create(draft("First coin")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create(draft("Second coin")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = repo.create(draft("Third coin")).await.unwrap();

        let ids: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_preserves_created_at_and_advances_updated_at() {
        let (_dir, repo) = setup();
        let created = repo.create(draft("Saint-Gaudens")).await.unwrap();

        let mut edited = created.clone();
        edited.current_value = dec!(1850.75);
        edited.created_at = created.created_at - Duration::days(365);
        edited.updated_at = created.updated_at - Duration::days(365);
        let sold = edited.with_sale(dec!(1900), acquired() + Duration::days(30));

        let stored = repo.update(sold).await.unwrap();
        assert_eq!(stored.created_at, created.created_at);
        assert!(stored.updated_at >= created.updated_at);
        assert_eq!(stored.current_value, dec!(1850.75));
        assert_eq!(stored.sold_price, Some(dec!(1900)));

        let unsold = repo.update(stored.without_sale()).await.unwrap();
        assert!(!unsold.is_sold);
        assert_eq!(unsold.sold_price, None);
        assert_eq!(unsold.sold_date, None);
        assert!(unsold.updated_at >= stored.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_asset_is_not_found() {
        let (_dir, repo) = setup();
        let ghost = draft("Ghost coin").into_asset("missing".to_string(), Utc::now());
        let err = repo.update(ghost).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_hard_and_not_repeatable() {
        let (_dir, repo) = setup();
        let created = repo.create(draft("Indian Head")).await.unwrap();

        repo.delete(&created.id).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());

        let err = repo.delete(&created.id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_committed_writes_are_announced() {
        let (_dir, repo) = setup();
        let mut changes = repo.notifier().open_channel(ASSETS_TABLE).unwrap();

        let created = repo.create(draft("Buffalo Nickel")).await.unwrap();
        let change = changes.recv().await.unwrap();
        assert_eq!(change.table, ASSETS_TABLE);
        assert_eq!(change.kind, ChangeKind::Insert);
        assert_eq!(change.row_id, created.id);

        let mut edited = created.clone();
        edited.current_value = dec!(1300);
        repo.update(edited).await.unwrap();
        assert_eq!(changes.recv().await.unwrap().kind, ChangeKind::Update);

        repo.delete(&created.id).await.unwrap();
        assert_eq!(changes.recv().await.unwrap().kind, ChangeKind::Delete);

        // Failed writes stay silent
        assert!(repo.delete(&created.id).await.is_err());
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_inconsistent_sale_fields_are_rejected_by_the_store() {
        let (_dir, repo) = setup();
        let created = repo.create(draft("Barber Dime")).await.unwrap();

        let mut broken = created.clone();
        broken.sold_price = Some(dec!(10));
        let err = repo.update(broken).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Repository(RepositoryError::Rejected(_) | RepositoryError::QueryFailed(_))
        ));

        let mut sold_without_price = created.clone();
        sold_without_price.is_sold = true;
        sold_without_price.sold_date = Some(Utc::now());
        let err = repo.update(sold_without_price).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Repository(RepositoryError::Rejected(_) | RepositoryError::QueryFailed(_))
        ));

        let mut draft_without_date = draft("Seated Liberty Dime");
        draft_without_date.is_sold = true;
        draft_without_date.sold_price = Some(dec!(25));
        assert!(repo.create(draft_without_date).await.is_err());

        let stored = repo.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_sold);
        assert_eq!(stored[0].sold_price, None);
    }
}
