use std::sync::Arc;

use crate::application::error::{ServiceError, ensure_non_empty, ensure_positive_id};
use crate::application::products::invalidate_report;
use crate::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, UpdateCategoryParams,
};
use crate::cache::{CacheStore, NullCache};
use crate::domain::entities::CategoryRecord;

const ENTITY: &str = "category";

#[derive(Debug, Clone)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: String,
}

/// Blank or absent fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    reader: Arc<dyn CategoriesRepo>,
    writer: Arc<dyn CategoriesWriteRepo>,
    cache: Arc<dyn CacheStore>,
}

impl CategoryService {
    pub fn new(reader: Arc<dyn CategoriesRepo>, writer: Arc<dyn CategoriesWriteRepo>) -> Self {
        Self {
            reader,
            writer,
            cache: Arc::new(NullCache),
        }
    }

    /// Renames and deletes change the category names embedded in the cached
    /// product report, so they drop it from this cache.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn list_all(&self) -> Result<Vec<CategoryRecord>, ServiceError> {
        self.reader.list_all().await.map_err(ServiceError::from)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<CategoryRecord, ServiceError> {
        ensure_positive_id(id)?;
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound { entity: ENTITY })
    }

    pub async fn create(
        &self,
        command: CreateCategoryCommand,
    ) -> Result<CategoryRecord, ServiceError> {
        let name = command.name.trim().to_string();
        let description = command.description.trim().to_string();
        ensure_non_empty(&name, "name")?;
        ensure_non_empty(&description, "description")?;

        self.writer
            .create_category(CreateCategoryParams { name, description })
            .await
            .map_err(ServiceError::from)
    }

    pub async fn edit(
        &self,
        id: i64,
        command: UpdateCategoryCommand,
    ) -> Result<CategoryRecord, ServiceError> {
        let existing = self.find_by_id(id).await?;

        let params = UpdateCategoryParams {
            id,
            name: non_blank(command.name).unwrap_or(existing.name),
            description: non_blank(command.description).unwrap_or(existing.description),
        };

        let category = self
            .writer
            .update_category(params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        invalidate_report(self.cache.as_ref()).await;
        Ok(category)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        ensure_positive_id(id)?;
        self.writer
            .delete_category(id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        invalidate_report(self.cache.as_ref()).await;
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    use crate::application::repos::RepoError;
    use crate::cache::{CacheKey, MemoryCache};

    fn category(id: i64, name: &str, description: &str) -> CategoryRecord {
        CategoryRecord {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[derive(Default)]
    struct StubCategories {
        rows: Mutex<Vec<CategoryRecord>>,
    }

    #[async_trait]
    impl CategoriesRepo for StubCategories {
        async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<CategoryRecord>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id == id)
                .cloned())
        }
    }

    #[async_trait]
    impl CategoriesWriteRepo for StubCategories {
        async fn create_category(
            &self,
            params: CreateCategoryParams,
        ) -> Result<CategoryRecord, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let record = category(rows.len() as i64 + 1, &params.name, &params.description);
            rows.push(record.clone());
            Ok(record)
        }

        async fn update_category(
            &self,
            params: UpdateCategoryParams,
        ) -> Result<CategoryRecord, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|row| row.id == params.id)
                .ok_or(RepoError::NotFound)?;
            row.name = params.name;
            row.description = params.description;
            Ok(row.clone())
        }

        async fn delete_category(&self, id: i64) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    fn service(repo: Arc<StubCategories>) -> CategoryService {
        CategoryService::new(repo.clone(), repo)
    }

    #[tokio::test]
    async fn create_requires_name_and_description() {
        let repo = Arc::new(StubCategories::default());
        let service = service(repo.clone());

        let err = service
            .create(CreateCategoryCommand {
                name: "Tools".to_string(),
                description: " ".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::ConstraintViolation("description")));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_trims_input() {
        let service = service(Arc::new(StubCategories::default()));

        let created = service
            .create(CreateCategoryCommand {
                name: "  Tools ".to_string(),
                description: "Hand tools".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Tools");
    }

    #[tokio::test]
    async fn edit_keeps_blank_fields() {
        let repo = Arc::new(StubCategories::default());
        repo.rows
            .lock()
            .unwrap()
            .push(category(1, "Tools", "Hand tools"));
        let service = service(repo);

        let updated = service
            .edit(
                1,
                UpdateCategoryCommand {
                    name: Some("".to_string()),
                    description: Some("Power and hand tools".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Tools");
        assert_eq!(updated.description, "Power and hand tools");
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let service = service(Arc::new(StubCategories::default()));

        assert!(matches!(
            service.find_by_id(9).await,
            Err(ServiceError::NotFound { entity: "category" })
        ));
        assert!(matches!(
            service.edit(9, UpdateCategoryCommand::default()).await,
            Err(ServiceError::NotFound { entity: "category" })
        ));
        assert!(matches!(
            service.delete(9).await,
            Err(ServiceError::NotFound { entity: "category" })
        ));
        assert!(matches!(
            service.delete(0).await,
            Err(ServiceError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn rename_and_delete_drop_cached_report() {
        let repo = Arc::new(StubCategories::default());
        repo.rows
            .lock()
            .unwrap()
            .extend([category(1, "Tools", "Hand tools"), category(2, "Garden", "Outdoor")]);
        let cache = Arc::new(MemoryCache::new());
        let service = service(repo).with_cache(cache.clone());
        let key = CacheKey::ProductReport.as_str();
        let ttl = std::time::Duration::from_secs(60);

        cache.set(key, b"{}", ttl).await.unwrap();
        service
            .edit(
                1,
                UpdateCategoryCommand {
                    name: Some("Workshop".to_string()),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);

        cache.set(key, b"{}", ttl).await.unwrap();
        service.delete(2).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_delete_keeps_cached_report() {
        let cache = Arc::new(MemoryCache::new());
        let service = service(Arc::new(StubCategories::default())).with_cache(cache.clone());
        let key = CacheKey::ProductReport.as_str();
        cache
            .set(key, b"{}", std::time::Duration::from_secs(60))
            .await
            .unwrap();

        assert!(service.delete(7).await.is_err());
        assert!(cache.get(key).await.unwrap().is_some());
    }
}
