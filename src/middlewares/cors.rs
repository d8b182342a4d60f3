use actix_cors::Cors;

pub fn create_cors() -> Cors {
    // Any origin; the API carries no cookies or credentials.
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
