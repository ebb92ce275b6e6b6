pub mod orders;
pub mod products;
pub mod users;

use actix_web::web;
use utoipa::OpenApi;

use crate::domain::ports::Storage;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::cancel_order,
        orders::list_orders_by_user,
        orders::order_history,
        products::create_product,
        products::list_products,
        products::get_product,
        users::upsert_user,
        users::list_users,
        users::get_user,
        users::delete_user,
    ),
    components(schemas(
        orders::CreateOrderRequest,
        orders::CreateOrderLineRequest,
        orders::UpdateOrderRequest,
        orders::OrderResponse,
        orders::OrderLineResponse,
        products::CreateProductRequest,
        products::ProductResponse,
        users::UpsertUserRequest,
        users::UserResponse,
    )),
    tags(
        (name = "orders", description = "Order placement and cancellation"),
        (name = "products", description = "Product catalog"),
        (name = "users", description = "Customer records"),
    )
)]
pub struct ApiDoc;

/// Registers every route for services backed by `S`.
///
/// The services themselves must be registered as app data beforehand.
pub fn configure<S: Storage>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order::<S>))
            .route("", web::get().to(orders::list_orders::<S>))
            .route("/history", web::get().to(orders::order_history::<S>))
            .route(
                "/by-user/{display_name}",
                web::get().to(orders::list_orders_by_user::<S>),
            )
            .route("/{id}", web::get().to(orders::get_order::<S>))
            .route("/{id}", web::patch().to(orders::update_order::<S>))
            .route("/{id}", web::delete().to(orders::cancel_order::<S>)),
    )
    .service(
        web::scope("/products")
            .route("", web::post().to(products::create_product::<S>))
            .route("", web::get().to(products::list_products::<S>))
            .route("/{id}", web::get().to(products::get_product::<S>)),
    )
    .service(
        web::scope("/users")
            .route("", web::put().to(users::upsert_user::<S>))
            .route("", web::get().to(users::list_users::<S>))
            .route("/{id}", web::get().to(users::get_user::<S>))
            .route("/{id}", web::delete().to(users::delete_user::<S>)),
    );
}
