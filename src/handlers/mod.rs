pub mod checkout;
pub mod newsletter;
pub mod orders;
pub mod settings;
pub mod showrooms;
pub mod working_hours;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::defaults,
        checkout::validate,
        checkout::place_order,
        orders::get_order,
        orders::list_orders,
        newsletter::subscribe,
        newsletter::unsubscribe,
        newsletter::mark_bounced,
        newsletter::list_subscriptions,
        newsletter::stats,
        settings::list_settings,
        settings::get_setting,
        settings::update_setting,
        settings::delete_setting,
        settings::public_settings,
        showrooms::list_showrooms,
        showrooms::get_showroom,
        showrooms::create_showroom,
        showrooms::update_showroom,
        showrooms::delete_showroom,
        showrooms::public_showrooms,
        working_hours::encode,
        working_hours::decode,
    ),
    tags(
        (name = "checkout", description = "Checkout wizard and order placement"),
        (name = "orders", description = "Order reads"),
        (name = "newsletter", description = "Newsletter subscriptions"),
        (name = "settings", description = "Site settings"),
        (name = "showrooms", description = "Showroom management"),
        (name = "public", description = "Cached storefront reads"),
        (name = "working-hours", description = "Opening hours text codec"),
    )
)]
pub struct ApiDoc;

/// Register every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("", web::post().to(checkout::place_order))
            .route("/defaults", web::get().to(checkout::defaults))
            .route("/validate", web::post().to(checkout::validate)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order)),
    )
    .service(
        web::scope("/newsletter")
            .route("/subscribe", web::post().to(newsletter::subscribe))
            .route("/unsubscribe", web::post().to(newsletter::unsubscribe))
            .route("/bounced", web::post().to(newsletter::mark_bounced))
            .route("/subscriptions", web::get().to(newsletter::list_subscriptions))
            .route("/stats", web::get().to(newsletter::stats)),
    )
    .service(
        web::scope("/settings")
            .route("", web::get().to(settings::list_settings))
            .route("/{key}", web::get().to(settings::get_setting))
            .route("/{key}", web::put().to(settings::update_setting))
            .route("/{key}", web::delete().to(settings::delete_setting)),
    )
    .service(
        web::scope("/showrooms")
            .route("", web::get().to(showrooms::list_showrooms))
            .route("", web::post().to(showrooms::create_showroom))
            .route("/{id}", web::get().to(showrooms::get_showroom))
            .route("/{id}", web::put().to(showrooms::update_showroom))
            .route("/{id}", web::delete().to(showrooms::delete_showroom)),
    )
    .service(
        web::scope("/public")
            .route("/settings", web::get().to(settings::public_settings))
            .route("/showrooms", web::get().to(showrooms::public_showrooms)),
    )
    .service(
        web::scope("/working-hours")
            .route("/encode", web::post().to(working_hours::encode))
            .route("/decode", web::post().to(working_hours::decode)),
    );
}
