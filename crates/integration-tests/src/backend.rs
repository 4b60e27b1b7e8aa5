//! In-process mock of the Tangelo backend.
//!
//! Implements the response envelope (`{ success, data }`), bearer
//! authentication, pagination metadata, and the error-body shapes the real
//! backend produces (`{ message }`, `{ errors: { field: [msg] } }`).
//! Every request is recorded so tests can assert on traffic.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use tangelo_client::types::{
    AddToCartRequest, CreatePlanRequest, CreateProductRequest, Order, OrderLineItem, PlanProduct,
    Product, SubscriptionPlan, UpdateCartItemRequest, UpdateOrderStatusRequest, UpdatePlanRequest,
    UpdateProductRequest, User, UserSubscription,
};
use tangelo_core::{
    OrderId, OrderStatus, PlanId, ProductId, SubscriptionId, UserId, UserRole,
};

const PAGE_LIMIT: u64 = 10;

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct MockState {
    accounts: Mutex<Vec<Account>>,
    tokens: Mutex<HashMap<String, UserId>>,
    products: Mutex<Vec<Product>>,
    orders: Mutex<Vec<Order>>,
    plans: Mutex<Vec<SubscriptionPlan>>,
    subscriptions: Mutex<HashMap<UserId, UserSubscription>>,
    requests: Mutex<Vec<String>>,
    /// When set, the next draft-order read answers with a body that does not
    /// match the envelope shape.
    corrupt_draft: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock backend listening on an ephemeral local port.
pub struct TestBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl TestBackend {
    /// Bind and serve the mock on 127.0.0.1.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL for client configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    // =========================================================================
    // Seeding & control
    // =========================================================================

    /// Insert a product directly.
    pub fn seed_product(&self, name: &str, price_minor: i64, stock: u32) -> ProductId {
        let id = ProductId::new(format!("p_{}", Uuid::new_v4()));
        lock(&self.state.products).push(Product {
            id: id.clone(),
            name: name.to_owned(),
            price: tangelo_core::MinorUnits::new(price_minor),
            stock,
            product_type: tangelo_core::ProductType::OneTime,
            created_at: None,
        });
        id
    }

    /// Insert a subscription plan for an existing product.
    pub fn seed_plan(&self, product_id: &ProductId) -> PlanId {
        let product = lock(&self.state.products)
            .iter()
            .find(|p| &p.id == product_id)
            .cloned()
            .expect("seed_plan: unknown product");

        let id = PlanId::new(format!("plan_{}", Uuid::new_v4()));
        lock(&self.state.plans).push(SubscriptionPlan {
            id: id.clone(),
            product_id: product_id.clone(),
            frequency: tangelo_core::SubscriptionFrequency::Monthly,
            currency: "USD".to_owned(),
            stripe_price_id: Some(format!("price_{}", Uuid::new_v4())),
            product: Some(PlanProduct {
                id: product.id,
                name: product.name,
                price: product.price,
            }),
            created_at: None,
        });
        id
    }

    /// Grant the given user an active subscription directly.
    pub fn grant_subscription(&self, user_id: &UserId) {
        let now = chrono::Utc::now();
        lock(&self.state.subscriptions).insert(
            user_id.clone(),
            UserSubscription {
                id: SubscriptionId::new(format!("sub_{}", Uuid::new_v4())),
                user_id: user_id.clone(),
                plan_id: PlanId::new("plan_seeded"),
                status: "active".to_owned(),
                current_period_start: now,
                current_period_end: now + chrono::Duration::days(30),
                cancel_at_period_end: false,
                created_at: None,
            },
        );
    }

    /// Invalidate every issued token; subsequent requests answer 401.
    pub fn revoke_all_tokens(&self) {
        lock(&self.state.tokens).clear();
    }

    /// Make the next `GET /orders/draft` answer with a malformed body.
    pub fn corrupt_next_draft_response(&self) {
        self.state.corrupt_draft.store(true, Ordering::SeqCst);
    }

    /// Every request seen so far, as `METHOD /path` lines.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state.requests).clone()
    }

    /// Number of recorded requests whose line contains `needle`.
    #[must_use]
    pub fn request_count(&self, needle: &str) -> usize {
        lock(&self.state.requests)
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth_register))
        .route("/auth/login", post(auth_login))
        .route("/orders/draft", get(get_draft))
        .route("/orders/draft/items", post(add_item))
        .route(
            "/orders/draft/items/{product_id}",
            axum::routing::patch(update_item).delete(remove_item),
        )
        .route("/orders/checkout/create-session", post(order_checkout_session))
        .route("/orders/checkout/success", get(order_checkout_success))
        .route("/orders/checkout/cancel", get(order_checkout_cancel))
        .route("/orders", get(my_orders))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/subscription-plans", get(list_plans).post(create_plan))
        .route(
            "/subscription-plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route(
            "/subscriptions/checkout/create-session",
            post(sub_checkout_session),
        )
        .route("/subscriptions/checkout/success", get(sub_checkout_success))
        .route("/subscriptions/checkout/cancel", get(sub_checkout_cancel))
        .route("/subscriptions/me", get(my_subscription))
        .route("/subscriptions/portal-session", post(portal_session))
        .route("/subscriptions/{id}", delete(cancel_subscription))
        .route("/digital-content", get(digital_content))
        .route("/admin/orders", get(admin_orders))
        .route("/admin/orders/{id}", put(admin_update_order))
        .with_state(state.clone());

    // Record on the outer router so the recorded line carries the full
    // request path (`/api/v1/...`) before `nest` strips the prefix.
    Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(state, record_request))
}

async fn record_request(
    State(state): State<Arc<MockState>>,
    request: Request,
    next: Next,
) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    lock(&state.requests).push(line);
    next.run(request).await
}

// =============================================================================
// Response helpers
// =============================================================================

fn ok(data: impl Serialize) -> Response {
    (
        StatusCode::OK,
        Json(json!({"success": true, "data": data})),
    )
        .into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}

fn fail_validation(errors: Value) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"errors": errors})),
    )
        .into_response()
}

fn authenticate(state: &MockState, headers: &HeaderMap) -> Result<User, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

    let user_id = lock(&state.tokens)
        .get(token)
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

    lock(&state.accounts)
        .iter()
        .find(|account| account.user.id == user_id)
        .map(|account| account.user.clone())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn require_admin(user: &User) -> Result<(), Response> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(fail(StatusCode::FORBIDDEN, "Forbidden"))
    }
}

fn paginate<T: Serialize>(items: &[T], page: u64) -> Value {
    let page = page.max(1);
    let total = items.len() as u64;
    let start = usize::try_from((page - 1) * PAGE_LIMIT).unwrap_or(usize::MAX);
    let data: Vec<&T> = items
        .iter()
        .skip(start)
        .take(usize::try_from(PAGE_LIMIT).unwrap_or(usize::MAX))
        .collect();
    json!({"data": data, "total": total, "limit": PAGE_LIMIT, "page": page})
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: Option<u64>,
}

// =============================================================================
// Auth handlers
// =============================================================================

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    #[serde(default)]
    role: Option<UserRole>,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn issue_token(state: &MockState, user_id: &UserId) -> String {
    let token = format!("tok_{}", Uuid::new_v4());
    lock(&state.tokens).insert(token.clone(), user_id.clone());
    token
}

async fn auth_register(
    State(state): State<Arc<MockState>>,
    Json(body): Json<RegisterBody>,
) -> Response {
    if !body.email.contains('@') {
        return fail_validation(json!({"email": ["Invalid email address"]}));
    }

    {
        let accounts = lock(&state.accounts);
        if accounts
            .iter()
            .any(|account| account.user.email.as_str() == body.email)
        {
            return fail_validation(json!({"email": ["Email is already taken"]}));
        }
    }

    let user = User {
        id: UserId::new(format!("u_{}", Uuid::new_v4())),
        email: match body.email.parse() {
            Ok(email) => email,
            Err(_) => return fail_validation(json!({"email": ["Invalid email address"]})),
        },
        role: body.role.unwrap_or(UserRole::User),
        draft_order_id: None,
        created_at: None,
    };

    lock(&state.accounts).push(Account {
        user: user.clone(),
        password: body.password,
    });

    let token = issue_token(&state, &user.id);
    ok(json!({"token": token, "user": user}))
}

async fn auth_login(State(state): State<Arc<MockState>>, Json(body): Json<LoginBody>) -> Response {
    let user = {
        let accounts = lock(&state.accounts);
        accounts
            .iter()
            .find(|account| {
                account.user.email.as_str() == body.email && account.password == body.password
            })
            .map(|account| account.user.clone())
    };

    match user {
        Some(user) => {
            let token = issue_token(&state, &user.id);
            ok(json!({"token": token, "user": user}))
        }
        None => fail(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

// =============================================================================
// Draft-order handlers
// =============================================================================

fn draft_index(orders: &[Order], user_id: &UserId) -> Option<usize> {
    orders
        .iter()
        .position(|order| &order.user_id == user_id && order.status == OrderStatus::Draft)
}

fn draft_or_new(orders: &mut Vec<Order>, user_id: &UserId) -> usize {
    if let Some(index) = draft_index(orders, user_id) {
        return index;
    }
    orders.push(Order {
        id: OrderId::new(format!("o_{}", Uuid::new_v4())),
        line_items: Vec::new(),
        status: OrderStatus::Draft,
        user_id: user_id.clone(),
        total_amount: None,
        created_at: None,
        updated_at: None,
    });
    orders.len() - 1
}

async fn get_draft(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if state.corrupt_draft.swap(false, Ordering::SeqCst) {
        return (StatusCode::OK, Json(json!({"ok": true}))).into_response();
    }

    let orders = lock(&state.orders);
    let draft = draft_index(&orders, &user.id).map(|i| orders[i].clone());
    ok(draft)
}

async fn add_item(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<AddToCartRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let product = {
        let products = lock(&state.products);
        match products.iter().find(|p| p.id == body.product_id) {
            Some(product) => product.clone(),
            None => return fail(StatusCode::NOT_FOUND, "Product not found"),
        }
    };

    let mut orders = lock(&state.orders);
    let index = draft_or_new(&mut orders, &user.id);
    let order = &mut orders[index];

    let existing = order
        .line_items
        .iter()
        .find(|line| line.product_id == body.product_id)
        .map_or(0, |line| line.quantity);

    if existing + body.quantity > product.stock {
        return fail_validation(json!({"quantity": ["Insufficient stock"]}));
    }

    if let Some(line) = order
        .line_items
        .iter_mut()
        .find(|line| line.product_id == body.product_id)
    {
        line.quantity += body.quantity;
    } else {
        order.line_items.push(OrderLineItem {
            product_id: product.id,
            name: product.name,
            price: product.price,
            quantity: body.quantity,
        });
    }

    ok(order.clone())
}

async fn update_item(
    State(state): State<Arc<MockState>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateCartItemRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let product_id = ProductId::new(product_id);

    let stock = {
        let products = lock(&state.products);
        match products.iter().find(|p| p.id == product_id) {
            Some(product) => product.stock,
            None => return fail(StatusCode::NOT_FOUND, "Product not found"),
        }
    };

    if body.quantity > stock {
        return fail_validation(json!({"quantity": ["Insufficient stock"]}));
    }

    let mut orders = lock(&state.orders);
    let Some(index) = draft_index(&orders, &user.id) else {
        return fail(StatusCode::NOT_FOUND, "No draft order");
    };
    let order = &mut orders[index];

    match order
        .line_items
        .iter_mut()
        .find(|line| line.product_id == product_id)
    {
        Some(line) => line.quantity = body.quantity,
        None => return fail(StatusCode::NOT_FOUND, "Item not in cart"),
    }

    ok(order.clone())
}

async fn remove_item(
    State(state): State<Arc<MockState>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let product_id = ProductId::new(product_id);

    let mut orders = lock(&state.orders);
    let Some(index) = draft_index(&orders, &user.id) else {
        return fail(StatusCode::NOT_FOUND, "No draft order");
    };
    let order = &mut orders[index];

    let before = order.line_items.len();
    order.line_items.retain(|line| line.product_id != product_id);
    if order.line_items.len() == before {
        return fail(StatusCode::NOT_FOUND, "Item not in cart");
    }

    ok(order.clone())
}

// =============================================================================
// Checkout handlers
// =============================================================================

async fn order_checkout_session(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let orders = lock(&state.orders);
    let has_items = draft_index(&orders, &user.id)
        .is_some_and(|i| !orders[i].line_items.is_empty());

    if !has_items {
        return fail(StatusCode::UNPROCESSABLE_ENTITY, "Cart is empty");
    }

    ok(json!({"checkoutUrl": format!("https://checkout.test/cs_{}", Uuid::new_v4())}))
}

#[derive(Deserialize)]
struct SessionQuery {
    #[serde(default)]
    #[allow(dead_code)]
    session_id: Option<String>,
}

async fn order_checkout_success(
    State(state): State<Arc<MockState>>,
    Query(_query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let mut orders = lock(&state.orders);
    if let Some(index) = draft_index(&orders, &user.id) {
        orders[index].status = OrderStatus::Paid;
    }

    ok(json!({"message": "Payment successful"}))
}

async fn order_checkout_cancel(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    ok(json!({"message": "Checkout cancelled"}))
}

// =============================================================================
// Product handlers
// =============================================================================

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let products = lock(&state.products);
    ok(paginate(&products, query.page.unwrap_or(1)))
}

async fn get_product(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let id = ProductId::new(id);
    let products = lock(&state.products);
    match products.iter().find(|p| p.id == id) {
        Some(product) => ok(product.clone()),
        None => fail(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<CreateProductRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let product = Product {
        id: ProductId::new(format!("p_{}", Uuid::new_v4())),
        name: body.name,
        price: body.price,
        stock: body.stock,
        product_type: body.product_type,
        created_at: None,
    };
    lock(&state.products).push(product.clone());
    ok(product)
}

async fn update_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateProductRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let id = ProductId::new(id);
    let mut products = lock(&state.products);
    let Some(product) = products.iter_mut().find(|p| p.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };

    if let Some(name) = body.name {
        product.name = name;
    }
    if let Some(price) = body.price {
        product.price = price;
    }
    if let Some(stock) = body.stock {
        product.stock = stock;
    }
    if let Some(product_type) = body.product_type {
        product.product_type = product_type;
    }

    ok(product.clone())
}

async fn delete_product(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let id = ProductId::new(id);
    lock(&state.products).retain(|p| p.id != id);
    ok(Value::Null)
}

// =============================================================================
// Order-history handlers
// =============================================================================

async fn my_orders(
    State(state): State<Arc<MockState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let orders = lock(&state.orders);
    let mine: Vec<Order> = orders
        .iter()
        .filter(|order| order.user_id == user.id)
        .cloned()
        .collect();
    ok(paginate(&mine, query.page.unwrap_or(1)))
}

async fn admin_orders(
    State(state): State<Arc<MockState>>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let orders = lock(&state.orders);
    ok(paginate(&orders, query.page.unwrap_or(1)))
}

async fn admin_update_order(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let id = OrderId::new(id);
    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Order not found");
    };

    order.status = body.status;
    ok(order.clone())
}

// =============================================================================
// Subscription handlers
// =============================================================================

async fn list_plans(State(state): State<Arc<MockState>>) -> Response {
    let plans = lock(&state.plans);
    ok(plans.clone())
}

async fn get_plan(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    let id = PlanId::new(id);
    let plans = lock(&state.plans);
    match plans.iter().find(|p| p.id == id) {
        Some(plan) => ok(plan.clone()),
        None => fail(StatusCode::NOT_FOUND, "Plan not found"),
    }
}

async fn create_plan(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePlanRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let product = {
        let products = lock(&state.products);
        match products.iter().find(|p| p.id == body.product_id) {
            Some(product) => product.clone(),
            None => return fail(StatusCode::NOT_FOUND, "Product not found"),
        }
    };

    let plan = SubscriptionPlan {
        id: PlanId::new(format!("plan_{}", Uuid::new_v4())),
        product_id: body.product_id,
        frequency: body.frequency,
        currency: body.currency,
        stripe_price_id: Some(body.stripe_price_id),
        product: Some(PlanProduct {
            id: product.id,
            name: product.name,
            price: product.price,
        }),
        created_at: None,
    };
    lock(&state.plans).push(plan.clone());
    ok(plan)
}

async fn update_plan(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdatePlanRequest>,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let id = PlanId::new(id);
    let mut plans = lock(&state.plans);
    let Some(plan) = plans.iter_mut().find(|p| p.id == id) else {
        return fail(StatusCode::NOT_FOUND, "Plan not found");
    };

    if let Some(frequency) = body.frequency {
        plan.frequency = frequency;
    }
    if let Some(currency) = body.currency {
        plan.currency = currency;
    }
    if let Some(stripe_price_id) = body.stripe_price_id {
        plan.stripe_price_id = Some(stripe_price_id);
    }

    ok(plan.clone())
}

async fn delete_plan(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if let Err(resp) = require_admin(&user) {
        return resp;
    }

    let id = PlanId::new(id);
    lock(&state.plans).retain(|plan| plan.id != id);
    ok(Value::Null)
}

#[derive(Deserialize)]
struct SubCheckoutBody {
    #[serde(rename = "planId")]
    plan_id: PlanId,
}

async fn sub_checkout_session(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<SubCheckoutBody>,
) -> Response {
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }

    let plans = lock(&state.plans);
    if !plans.iter().any(|plan| plan.id == body.plan_id) {
        return fail(StatusCode::NOT_FOUND, "Plan not found");
    }

    ok(json!({"checkoutUrl": format!("https://checkout.test/sub_{}", Uuid::new_v4())}))
}

async fn sub_checkout_success(
    State(state): State<Arc<MockState>>,
    Query(_query): Query<SessionQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let now = chrono::Utc::now();
    lock(&state.subscriptions).insert(
        user.id.clone(),
        UserSubscription {
            id: SubscriptionId::new(format!("sub_{}", Uuid::new_v4())),
            user_id: user.id.clone(),
            plan_id: PlanId::new("plan_checkout"),
            status: "active".to_owned(),
            current_period_start: now,
            current_period_end: now + chrono::Duration::days(30),
            cancel_at_period_end: false,
            created_at: None,
        },
    );

    ok(json!({"message": "Subscription activated"}))
}

async fn sub_checkout_cancel(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    ok(json!({"message": "Subscription checkout cancelled"}))
}

async fn my_subscription(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let subscriptions = lock(&state.subscriptions);
    ok(subscriptions.get(&user.id).cloned())
}

async fn portal_session(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if !lock(&state.subscriptions).contains_key(&user.id) {
        return fail(StatusCode::UNPROCESSABLE_ENTITY, "No active subscription");
    }

    ok(json!({"portalUrl": format!("https://portal.test/ps_{}", Uuid::new_v4())}))
}

async fn cancel_subscription(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let id = SubscriptionId::new(id);
    let mut subscriptions = lock(&state.subscriptions);
    match subscriptions.get(&user.id) {
        Some(sub) if sub.id == id => {
            subscriptions.remove(&user.id);
            ok(Value::Null)
        }
        _ => fail(StatusCode::NOT_FOUND, "Subscription not found"),
    }
}

async fn digital_content(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if !lock(&state.subscriptions).contains_key(&user.id) {
        return fail(StatusCode::FORBIDDEN, "Active subscription required");
    }

    ok(json!({"content": "Welcome, subscriber. Here is the premium content."}))
}
