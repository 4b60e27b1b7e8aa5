//! Product and subscription-plan catalog endpoints.
//!
//! Catalog reads are cached with a 5-minute TTL; admin mutations drop the
//! whole cache rather than tracking which pages a change lands on. Cart and
//! order endpoints are never cached (mutable state).

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use tangelo_core::{PlanId, ProductId};

use crate::api::{ApiClient, Paginated};
use crate::error::ApiError;
use crate::types::{
    CreatePlanRequest, CreateProductRequest, Product, SubscriptionPlan, UpdatePlanRequest,
    UpdateProductRequest,
};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Paginated<Product>),
    Plan(Box<SubscriptionPlan>),
    Plans(Vec<SubscriptionPlan>),
}

/// Client for `/products` and `/subscription-plans` endpoints.
#[derive(Clone)]
pub struct CatalogService {
    api: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self { api, cache }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// A page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, page: u64) -> Result<Paginated<Product>, ApiError> {
        let cache_key = format!("products:{page}");

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("cache hit for products");
            return Ok(products);
        }

        let products: Paginated<Product> = self.api.get(&format!("/products?page={page}")).await?;

        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// A single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.api.get(&format!("/products/{id}")).await?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, ApiError> {
        let product = self.api.post("/products", request).await?;
        self.invalidate_all().await;
        Ok(product)
    }

    /// Update a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        let product = self.api.put(&format!("/products/{id}"), request).await?;
        self.invalidate_all().await;
        Ok(product)
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.delete(&format!("/products/{id}")).await?;
        self.invalidate_all().await;
        Ok(())
    }

    // =========================================================================
    // Subscription plans
    // =========================================================================

    /// All subscription plans.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>, ApiError> {
        let cache_key = "plans".to_owned();

        if let Some(CacheValue::Plans(plans)) = self.cache.get(&cache_key).await {
            debug!("cache hit for plans");
            return Ok(plans);
        }

        let plans: Vec<SubscriptionPlan> = self.api.get("/subscription-plans").await?;

        self.cache
            .insert(cache_key, CacheValue::Plans(plans.clone()))
            .await;

        Ok(plans)
    }

    /// A single plan by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is not found or the request fails.
    #[instrument(skip(self), fields(plan_id = %id))]
    pub async fn plan(&self, id: &PlanId) -> Result<SubscriptionPlan, ApiError> {
        let cache_key = format!("plan:{id}");

        if let Some(CacheValue::Plan(plan)) = self.cache.get(&cache_key).await {
            debug!("cache hit for plan");
            return Ok(*plan);
        }

        let plan: SubscriptionPlan = self.api.get(&format!("/subscription-plans/{id}")).await?;

        self.cache
            .insert(cache_key, CacheValue::Plan(Box::new(plan.clone())))
            .await;

        Ok(plan)
    }

    /// Create a subscription plan (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn create_plan(&self, request: &CreatePlanRequest) -> Result<SubscriptionPlan, ApiError> {
        let plan = self.api.post("/subscription-plans", request).await?;
        self.invalidate_all().await;
        Ok(plan)
    }

    /// Update a subscription plan (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request), fields(plan_id = %id))]
    pub async fn update_plan(
        &self,
        id: &PlanId,
        request: &UpdatePlanRequest,
    ) -> Result<SubscriptionPlan, ApiError> {
        let plan = self
            .api
            .put(&format!("/subscription-plans/{id}"), request)
            .await?;
        self.invalidate_all().await;
        Ok(plan)
    }

    /// Delete a subscription plan (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(plan_id = %id))]
    pub async fn delete_plan(&self, id: &PlanId) -> Result<(), ApiError> {
        let _: serde_json::Value = self.api.delete(&format!("/subscription-plans/{id}")).await?;
        self.invalidate_all().await;
        Ok(())
    }

    // =========================================================================
    // Cache management
    // =========================================================================

    /// Drop all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
