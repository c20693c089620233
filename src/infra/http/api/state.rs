use std::sync::Arc;

use crate::application::categories::CategoryService;
use crate::application::products::ProductService;
use crate::application::repos::HealthRepo;
use crate::application::users::UserService;
use crate::cache::CacheStore;

#[derive(Clone)]
pub struct ApiState {
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub users: Arc<UserService>,
    pub health: Arc<dyn HealthRepo>,
    pub cache: Arc<dyn CacheStore>,
}
